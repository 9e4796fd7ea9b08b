use std::cell::RefCell;
use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::StoreError;

/// In-memory store used natively and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
    /// Every operation fails (simulates storage being disabled)
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails
    pub fn failing() -> Self {
        Self {
            slots: RefCell::default(),
            failing: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            Err(StoreError::Unavailable("storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
