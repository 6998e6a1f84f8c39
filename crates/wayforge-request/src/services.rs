//! Host services the request layer reads and writes.

use std::collections::HashMap;
use std::sync::Mutex;

use wayforge_protocol::{ParticipantId, ServiceError};

/// The economy.
///
/// Optional: without a ledger, requests are free whatever the configured
/// cost says.
pub trait Ledger: Send + Sync + 'static {
    fn balance(&self, participant: ParticipantId) -> f64;

    fn withdraw(&self, participant: ParticipantId, amount: f64) -> Result<(), ServiceError>;
}

/// Per-participant "accept teleport requests" switch.
pub trait RequestPreferences: Send + Sync + 'static {
    fn accepts_requests(&self, participant: ParticipantId) -> bool;

    fn set_accepts_requests(&self, participant: ParticipantId, accepts: bool);
}

/// Preferences held in memory, falling back to a default for anyone who
/// never changed theirs.
#[derive(Debug)]
pub struct MemoryPreferences {
    default_accepts: bool,
    overrides: Mutex<HashMap<ParticipantId, bool>>,
}

impl MemoryPreferences {
    pub fn new(default_accepts: bool) -> Self {
        Self {
            default_accepts,
            overrides: Mutex::new(HashMap::new()),
        }
    }
}

impl RequestPreferences for MemoryPreferences {
    fn accepts_requests(&self, participant: ParticipantId) -> bool {
        let overrides = self.overrides.lock().unwrap_or_else(|e| e.into_inner());
        overrides
            .get(&participant)
            .copied()
            .unwrap_or(self.default_accepts)
    }

    fn set_accepts_requests(&self, participant: ParticipantId, accepts: bool) {
        let mut overrides = self.overrides.lock().unwrap_or_else(|e| e.into_inner());
        overrides.insert(participant, accepts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_preferences_fall_back_to_default() {
        let on = MemoryPreferences::new(true);
        let off = MemoryPreferences::new(false);
        assert!(on.accepts_requests(ParticipantId(1)));
        assert!(!off.accepts_requests(ParticipantId(1)));
    }

    #[test]
    fn test_memory_preferences_override_sticks() {
        let prefs = MemoryPreferences::new(true);
        prefs.set_accepts_requests(ParticipantId(1), false);

        assert!(!prefs.accepts_requests(ParticipantId(1)));
        assert!(prefs.accepts_requests(ParticipantId(2)));
    }
}
