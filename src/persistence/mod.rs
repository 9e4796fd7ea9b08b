//! Durable key-value persistence
//!
//! Features:
//! - String slots keyed by name (LocalStorage on web, in-memory natively)
//! - JSON helpers for typed slots
//! - Best-score slot that survives restarts

mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Slot holding the local best score
pub const BEST_SCORE_KEY: &str = "flappy_sky_best_score";

/// A flat string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

}

/// Read a JSON-encoded slot. Missing slots are `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Write a value into a slot as JSON
pub fn save_json<T: Serialize>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Load the local best score, treating unreadable slots as zero
pub fn load_best_score(store: &impl KeyValueStore) -> u32 {
    match load_json::<u32>(store, BEST_SCORE_KEY) {
        Ok(Some(best)) => {
            log::info!("Loaded local best score: {}", best);
            best
        }
        Ok(None) => 0,
        Err(err) => {
            log::warn!("Ignoring unreadable best score: {}", err);
            0
        }
    }
}

/// Persist the local best score. Failures are logged, never raised.
pub fn save_best_score(store: &impl KeyValueStore, best: u32) {
    match save_json(store, BEST_SCORE_KEY, &best) {
        Ok(()) => log::info!("Best score saved ({})", best),
        Err(err) => log::warn!("Could not save best score: {}", err),
    }
}
