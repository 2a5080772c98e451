//! Connection state machine.

/// Lifecycle state of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected; commands and transfers are rejected.
    #[default]
    Disconnected,
    /// Connected; commands and transfers are accepted.
    Connected,
}

impl ConnectionState {
    /// Move to `Connected`.
    ///
    /// Returns `true` if the state changed, `false` if already connected.
    pub fn connect(&mut self) -> bool {
        let changed = *self == ConnectionState::Disconnected;
        *self = ConnectionState::Connected;
        changed
    }

    /// Move to `Disconnected`.
    ///
    /// Returns `true` if the state changed, `false` if already disconnected.
    pub fn close(&mut self) -> bool {
        let changed = *self == ConnectionState::Connected;
        *self = ConnectionState::Disconnected;
        changed
    }

    /// Check if session can accept commands.
    pub fn can_execute(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
