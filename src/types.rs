use std::fmt::{self, Display};

use serde::Deserialize;

/// Host-standby transitions recognised in a vCenter event description.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    /// "DRS put <host> into standby mode".
    EnterStandby,
    /// "DRS moved <host> out of standby mode".
    ExitStandby,
    /// "DRS cannot move <host> out of standby mode". The host did not wake,
    /// so monitoring is switched back on to let the node alert.
    ExitStandbyFailed,
}

struct Rule {
    kind: EventKind,
    subject: &'static str,
    transition: &'static str,
}

// Evaluated in order; every matching rule fires.
const RULES: [Rule; 3] = [
    Rule {
        kind: EventKind::EnterStandby,
        subject: "DRS put",
        transition: "into standby mode",
    },
    Rule {
        kind: EventKind::ExitStandby,
        subject: "DRS moved",
        transition: "out of standby mode",
    },
    Rule {
        kind: EventKind::ExitStandbyFailed,
        subject: "DRS cannot move",
        transition: "out of standby mode",
    },
];

impl EventKind {
    /// Returns every event kind whose pattern matches `description`.
    ///
    /// Matching is case-sensitive substring search. The rules are not
    /// mutually exclusive: a description matching several of them yields
    /// several kinds, in rule order.
    #[must_use]
    pub fn classify(description: &str) -> Vec<Self> {
        RULES
            .iter()
            .filter(|rule| {
                description.contains(rule.subject) && description.contains(rule.transition)
            })
            .map(|rule| rule.kind)
            .collect()
    }

    #[must_use]
    pub const fn action(self) -> SuppressionAction {
        match self {
            Self::EnterStandby => SuppressionAction::Suppress,
            Self::ExitStandby | Self::ExitStandbyFailed => SuppressionAction::Resume,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnterStandby => "enter_standby",
            Self::ExitStandby => "exit_standby",
            Self::ExitStandbyFailed => "exit_standby_failed",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SuppressionAction {
    Suppress,
    Resume,
}

impl Display for SuppressionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Suppress => "suppress",
            Self::Resume => "resume",
        })
    }
}

/// `SuppressionMode` as reported by `Orion.AlertSuppression`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SuppressionMode {
    NotSuppressed,
    Suppressed,
    SuppressedByParent,
    SuppressionScheduled,
    Unknown(i64),
}

impl From<i64> for SuppressionMode {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::NotSuppressed,
            1 => Self::Suppressed,
            2 => Self::SuppressedByParent,
            3 => Self::SuppressionScheduled,
            other => Self::Unknown(other),
        }
    }
}

impl SuppressionMode {
    /// Alerts for the node itself are muted. Suppression inherited from a
    /// parent or only scheduled still reads as active.
    #[must_use]
    pub const fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppressed)
    }

    #[must_use]
    pub const fn as_code(self) -> i64 {
        match self {
            Self::NotSuppressed => 0,
            Self::Suppressed => 1,
            Self::SuppressedByParent => 2,
            Self::SuppressionScheduled => 3,
            Self::Unknown(code) => code,
        }
    }
}

impl Display for SuppressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSuppressed => f.write_str("not suppressed"),
            Self::Suppressed => f.write_str("suppressed"),
            Self::SuppressedByParent => f.write_str("suppressed by parent"),
            Self::SuppressionScheduled => f.write_str("suppression scheduled"),
            Self::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}

/// Opaque SWIS URI of a managed node, e.g.
/// `swis://orion.example.com/Orion/Orion.Nodes/NodeID=42`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct NodeUri(String);

impl NodeUri {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Alert suppression state of one entity, fetched fresh on every call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SuppressionState {
    pub entity_uri: Option<NodeUri>,
    pub mode: SuppressionMode,
    pub suppressed_from: Option<String>,
    pub suppressed_until: Option<String>,
}

impl SuppressionState {
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        self.mode.is_suppressed()
    }
}
