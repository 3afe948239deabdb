//! Session types: the guest identity and the bootstrap that creates it.

use std::fmt;

use rapidboard_protocol::MemberId;
use rapidboard_runner::RunnerConfig;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`SessionManager`](crate::SessionManager).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store key the member id is persisted under.
    pub player_id_key: String,

    /// Store key of the device-local guest identifier.
    pub device_id_key: String,

    /// Settings for the manager's operation runner.
    pub runner: RunnerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_id_key: "RapidLeaderboardPlayerID".to_string(),
            device_id_key: "RapidLeaderboardDeviceID".to_string(),
            runner: RunnerConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Sets the member id key.
    pub fn with_player_id_key(mut self, key: impl Into<String>) -> Self {
        self.player_id_key = key.into();
        self
    }

    /// Sets the device identifier key.
    pub fn with_device_id_key(mut self, key: impl Into<String>) -> Self {
        self.device_id_key = key.into();
        self
    }

    /// Sets the runner configuration.
    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Who the leaderboard calls are made as.
///
/// `Unset` is an ordinary state, not an error: it is what every run sees
/// before the bootstrap settles, and what stays after a failed bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// No guest identity.
    Unset,
    /// The guest's member id.
    Member(MemberId),
}

impl Identity {
    /// Interprets a stored value. The empty string is `Unset`.
    pub fn from_stored(value: String) -> Self {
        if value.is_empty() {
            Self::Unset
        } else {
            Self::Member(MemberId::new(value))
        }
    }

    /// The member id, if set.
    pub fn member_id(&self) -> Option<&MemberId> {
        match self {
            Self::Unset => None,
            Self::Member(id) => Some(id),
        }
    }

    /// `true` for `Member`.
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Member(_))
    }
}

// ---------------------------------------------------------------------------
// BootstrapState
// ---------------------------------------------------------------------------

/// Progress of the one-time guest bootstrap.
///
/// ```text
/// NotStarted ──initialize()──→ Pending ──┬──→ Established(id)
///                                         └──→ Failed(message)
/// ```
///
/// Both end states are final for the life of the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapState {
    /// `initialize` hasn't been called.
    NotStarted,
    /// The guest session call is in flight.
    Pending,
    /// The guest session was established and its id persisted.
    Established(MemberId),
    /// The bootstrap failed with this message. Identity stays unset.
    Failed(String),
}

impl BootstrapState {
    /// `true` once the bootstrap reached an end state.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Established(_) | Self::Failed(_))
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => f.write_str("not started"),
            Self::Pending => f.write_str("pending"),
            Self::Established(id) => write!(f, "established as {id}"),
            Self::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stored_empty_is_unset() {
        assert_eq!(Identity::from_stored(String::new()), Identity::Unset);
    }

    #[test]
    fn test_from_stored_value_is_member() {
        let identity = Identity::from_stored("42".into());
        assert!(identity.is_set());
        assert_eq!(identity.member_id(), Some(&MemberId::new("42")));
    }

    #[test]
    fn test_default_config_keys() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.player_id_key, "RapidLeaderboardPlayerID");
        assert_eq!(cfg.device_id_key, "RapidLeaderboardDeviceID");
    }

    #[test]
    fn test_bootstrap_state_settled_only_at_end() {
        assert!(!BootstrapState::NotStarted.is_settled());
        assert!(!BootstrapState::Pending.is_settled());
        assert!(BootstrapState::Failed("x".into()).is_settled());
        assert!(BootstrapState::Established(MemberId::new("1")).is_settled());
    }
}
