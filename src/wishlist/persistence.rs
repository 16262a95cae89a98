use super::{WishlistError, WishlistItem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Key the wishlist is stored under on the client.
pub const STORAGE_NAME: &str = "wishlist-storage";

pub trait WishlistPersistence {
    fn load(&self) -> Result<Vec<WishlistItem>, WishlistError>;
    fn save(&self, items: &[WishlistItem]) -> Result<(), WishlistError>;
}

/// On-disk envelope: `{"state":{"items":[...]},"version":0}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Envelope {
    pub state: EnvelopeState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct EnvelopeState {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl Envelope {
    pub(crate) fn encode(items: &[WishlistItem]) -> Result<String, WishlistError> {
        let envelope = Envelope { state: EnvelopeState { items: items.to_vec() }, version: 0 };
        Ok(serde_json::to_string(&envelope)?)
    }

    pub(crate) fn decode(raw: &str) -> Result<Vec<WishlistItem>, WishlistError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        Ok(envelope.state.items)
    }
}

/// JSON file on local disk. A missing file is an empty wishlist.
#[derive(Clone, Debug)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// `<dir>/wishlist-storage.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{STORAGE_NAME}.json")))
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl WishlistPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<WishlistItem>, WishlistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Envelope::decode(&raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &[WishlistItem]) -> Result<(), WishlistError> {
        let raw = Envelope::encode(items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Shared in-memory slot. Clones observe the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Vec<WishlistItem>>>,
}

impl MemoryPersistence {
    pub fn with_items(items: Vec<WishlistItem>) -> Self {
        Self { slot: Arc::new(Mutex::new(items)) }
    }

    /// Decodes a stored envelope; corrupt input yields an empty slot.
    pub fn from_encoded(raw: &str) -> Self {
        Self::with_items(Envelope::decode(raw).unwrap_or_default())
    }

    pub fn snapshot(&self) -> Vec<WishlistItem> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn encoded(&self) -> Result<String, WishlistError> {
        Envelope::encode(&self.snapshot())
    }
}

impl WishlistPersistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<WishlistItem>, WishlistError> {
        Ok(self.snapshot())
    }

    fn save(&self, items: &[WishlistItem]) -> Result<(), WishlistError> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wishlist::WishlistStore;
    use rust_decimal::Decimal;

    fn item(id: &str) -> WishlistItem {
        WishlistItem { id: id.into(), name: "Oversized Tee".into(), price: Decimal::new(899, 0), image: Some("https://cdn/tee.png".into()) }
    }

    #[test]
    fn test_file_round_trip_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::in_dir(dir.path());
        assert!(persistence.load().unwrap().is_empty());

        let mut store = WishlistStore::open(persistence.clone());
        store.add_item(item("p1"));
        store.close();

        let raw = std::fs::read_to_string(persistence.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["state"]["items"][0]["id"], "p1");
        assert_eq!(json["state"]["items"][0]["price"], 899.0);
        assert_eq!(json["version"], 0);

        let reopened = WishlistStore::open(persistence);
        assert!(reopened.is_in_wishlist("p1"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = JsonFilePersistence::in_dir(dir.path());
        std::fs::write(persistence.path(), "not json").unwrap();
        assert!(persistence.load().is_err());
        assert!(WishlistStore::open(persistence).is_empty());
    }

    #[test]
    fn test_memory_encoding() {
        let memory = MemoryPersistence::with_items(vec![item("p9")]);
        let decoded = MemoryPersistence::from_encoded(&memory.encoded().unwrap());
        assert_eq!(decoded.snapshot(), vec![item("p9")]);
        assert!(MemoryPersistence::from_encoded("{").snapshot().is_empty());
    }
}
