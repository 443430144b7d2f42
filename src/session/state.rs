//! Session lifecycle states.

/// Where a session is in its lifecycle.
///
/// ```text
/// Connected --disconnect--> Recovering --success--> Connected
///                               |
///                               +--stop/removal--> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Live client registered with the manager.
    Connected,
    /// Client torn down, waiting before reconnect attempt `attempt`
    /// (counting from zero).
    Recovering { attempt: u32 },
    /// Recovery gave up because the manager stopped or the server was
    /// removed. Terminal.
    Aborted,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_equality() {
        assert_eq!(SessionState::Connected, SessionState::Connected);
        assert_eq!(
            SessionState::Recovering { attempt: 1 },
            SessionState::Recovering { attempt: 1 }
        );
        assert_ne!(
            SessionState::Recovering { attempt: 1 },
            SessionState::Recovering { attempt: 2 }
        );
        assert!(SessionState::Connected.is_connected());
        assert!(!SessionState::Aborted.is_connected());
    }
}
