//! Cached key material for the active KMS key.
//!
//! A fill reads a [`KeySnapshot`], fetches from the remote without holding the
//! lock and then stores the result only if the generation is still the one it
//! read. Invalidation and rotation bump the generation, so a fill started
//! before them is discarded instead of repopulating the cache.

use alloy::primitives::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySnapshot {
    pub key_id: String,
    pub generation: u64,
    pub public_key: Option<[u8; 65]>,
    pub address: Option<Address>,
}

#[derive(Debug)]
pub struct KeyState {
    key_id: String,
    generation: u64,
    public_key: Option<[u8; 65]>,
    address: Option<Address>,
}

impl KeyState {
    pub fn new(key_id: String) -> Self {
        Self {
            key_id,
            generation: 0,
            public_key: None,
            address: None,
        }
    }

    pub fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            key_id: self.key_id.clone(),
            generation: self.generation,
            public_key: self.public_key,
            address: self.address,
        }
    }

    /// Caches a public key fetched under `generation`. Returns whether it was kept.
    pub fn store_public_key(&mut self, generation: u64, public_key: [u8; 65]) -> bool {
        if generation != self.generation {
            return false;
        }
        self.public_key = Some(public_key);
        true
    }

    /// Caches an address derived under `generation`. Returns whether it was kept.
    pub fn store_address(&mut self, generation: u64, address: Address) -> bool {
        if generation != self.generation {
            return false;
        }
        self.address = Some(address);
        true
    }

    pub fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.public_key = None;
        self.address = None;
    }

    /// Switches to `new_key_id` and drops everything cached for the old key.
    /// Returns the previous key id.
    pub fn rotate(&mut self, new_key_id: String) -> String {
        let old_key_id = std::mem::replace(&mut self.key_id, new_key_id);
        self.invalidate();
        old_key_id
    }
}
