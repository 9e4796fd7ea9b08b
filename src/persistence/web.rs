use super::KeyValueStore;
use crate::error::StoreError;

/// Browser LocalStorage
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the window's LocalStorage (None in private mode / no window)
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { storage })
    }
}

fn js_err(err: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Storage(format!("{:?}", err))
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(js_err)
    }
}
