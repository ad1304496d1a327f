//! # KMS Key Check
//!
//! Verifies that the configured KMS key is reachable and prints its Ethereum
//! address. Configuration is read from the environment (a `.env` file is
//! loaded when present).
//!
//! ## Usage
//!
//! ```bash
//! KMS_KEY_ID=1234abcd-12ab-34cd-56ef-1234567890ab AWS_REGION=us-east-1 \
//!   cargo run --example check_key
//!
//! # Sign a digest as well
//! cargo run --example check_key -- --digest 0x4242424242424242424242424242424242424242424242424242424242424242
//! ```

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use kms_evm_signer::{
    logging::setup_logging, utils::to_checksum_address, KmsSigner, KmsSignerConfig,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// KMS key id or ARN. Overrides KMS_KEY_ID.
    #[arg(long)]
    key_id: Option<String>,

    /// Region of the key. Overrides KMS_REGION / AWS_REGION.
    #[arg(long)]
    region: Option<String>,

    /// 32-byte digest (hex, with or without 0x prefix) to sign after the check.
    #[arg(long)]
    digest: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();

    let mut config = KmsSignerConfig::from_env_with_key_id(args.key_id)
        .wrap_err("Failed to load signer configuration")?;
    if let Some(region) = args.region {
        config.region = Some(region);
    }

    let signer = KmsSigner::from_config(config)
        .await
        .wrap_err("Failed to create KMS signer")?;

    let health = signer.health_check().await;
    println!("Status:  {:?}", health.status);
    println!("Message: {}", health.message);
    if !health.is_healthy() {
        return Err(eyre!("KMS key is not usable"));
    }

    let address = signer.get_address().await?;
    println!("Address: {}", to_checksum_address(&address));

    if let Some(digest) = args.digest {
        let signature = signer.sign_hex(&digest).await?;
        println!("r: {}", signature.r);
        println!("s: {}", signature.s);
        println!("v: {}", signature.v);
        println!("Signature: 0x{}", hex::encode(signature.as_bytes()));
    }

    Ok(())
}
