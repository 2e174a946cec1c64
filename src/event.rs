use crate::types::EventKind;

pub const ALARM_NAME_VAR: &str = "VMWARE_ALARM_NAME";
pub const ALARM_TARGET_NAME_VAR: &str = "VMWARE_ALARM_TARGET_NAME";
pub const ALARM_EVENT_DESCRIPTION_VAR: &str = "VMWARE_ALARM_EVENTDESCRIPTION";

const DEFAULT_ALARM_NAME: &str = "leeg";
const DEFAULT_TARGET_NAME: &str = "debug_VMWARE_ALARM_TARGET_NAME";
const DEFAULT_EVENT_DESCRIPTION: &str = "debug_VMWARE_ALARM_EVENTDESCRIPTION";

/// Alarm fields exported by a vCenter alarm action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEvent {
    pub alarm_name: String,
    pub target_name: String,
    pub description: String,
}

impl AlarmEvent {
    /// Reads the alarm from the process environment, falling back to
    /// placeholder values so the binary can be run by hand.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        Self {
            alarm_name: read(ALARM_NAME_VAR, DEFAULT_ALARM_NAME),
            target_name: read(ALARM_TARGET_NAME_VAR, DEFAULT_TARGET_NAME),
            description: read(ALARM_EVENT_DESCRIPTION_VAR, DEFAULT_EVENT_DESCRIPTION),
        }
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        EventKind::classify(&self.description)
    }
}
