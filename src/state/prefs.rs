use serde::{Deserialize, Serialize};

/// Key under which [`Prefs`] live in eframe's persistence store.
pub const STORAGE_KEY: &str = "liquidity_pulse_prefs";

/// Locally persisted state: the chat session id plus the caller-supplied LLM
/// credential. Scoped to this machine, transmitted per-request, never stored
/// server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefs {
    pub session_id: String,
    pub api_key: String,
    pub provider: String,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            api_key: String::new(),
            provider: "openrouter".to_string(),
        }
    }
}

impl Prefs {
    /// Load saved prefs, minting a fresh session id on first run.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        storage
            .and_then(|s| eframe::get_value(s, STORAGE_KEY))
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, STORAGE_KEY, self);
    }
}
