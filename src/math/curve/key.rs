use std::fmt;

use serde::{
    Deserialize,
    Serialize
};
use uuid::Uuid;

/// 係數的唯一識別。
///
/// Key 屬於呼叫端（例如 optimizer）的命名空間，曲線本身只負責保存。
/// 需要新 key 時以 `Key::new()` 產生 random v4 UUID，
/// 已有自己 UUID 的呼叫端可直接用 `Key::from_uuid` 包裝。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(Uuid);

impl Key {
    pub fn new() -> Key {
        Key(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Key {
        Key(uuid)
    }

    pub fn uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Key {
    fn default() -> Self {
        Key::new()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
