//! Worker lifecycle states and reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle states, in the order a worker moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Uninstalled,
    Installing,
    /// Installed but not yet controlling clients.
    Installed,
    Activating,
    /// Controlling clients; fetch events are intercepted.
    Active,
    /// Retired by the host; no further events are handled.
    Redundant,
}

impl LifecycleState {
    pub fn can_intercept_fetch(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninstalled => "uninstalled",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    /// Shell documents stored; zero when pre-population failed.
    pub precached: usize,
    /// Always true: a new install replaces the previous instance immediately.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    /// Regions removed because they are outside the allow-list.
    pub deleted: Vec<String>,
    pub clients_claimed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WarmReport {
    pub stored: Vec<String>,
    pub failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_intercepts() {
        assert!(LifecycleState::Active.can_intercept_fetch());
        for state in [
            LifecycleState::Uninstalled,
            LifecycleState::Installing,
            LifecycleState::Installed,
            LifecycleState::Activating,
            LifecycleState::Redundant,
        ] {
            assert!(!state.can_intercept_fetch(), "{state} must not intercept");
        }
    }

    #[test]
    fn test_state_names() {
        assert_eq!(LifecycleState::default().to_string(), "uninstalled");
        assert_eq!(serde_json::to_string(&LifecycleState::Active).unwrap(), "\"active\"");
    }
}
