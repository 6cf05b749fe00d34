//! Connection defaults.
//!
//! The constants are the process-wide fallbacks; [`ConnectDefaults`] carries
//! them to the point of use so callers (and tests) can substitute their own
//! values without touching global state.

use std::time::{Duration, Instant};

/// Budget for resolve + open + optional ping.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
/// PostgreSQL `statement_timeout`.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);
/// MySQL `net_read_timeout`.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
/// MySQL `net_write_timeout`.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Maximum open connections for relational pools.
pub const DEFAULT_OPEN_CONNECTIONS: usize = 10;
/// Idle connections kept by relational pools.
pub const DEFAULT_IDLE_CONNECTIONS: usize = 10;
/// Server selection timeout forced in tunnel mode.
pub const TUNNEL_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline used when `start + budget` does not fit the clock.
pub const DEADLINE_CAP: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Defaults applied when a [`DbConfig`](crate::DbConfig) field is zero or unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectDefaults {
    pub connect_timeout: Duration,
    pub statement_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_open_connections: usize,
    pub max_idle_connections: usize,
    pub tunnel_server_selection_timeout: Duration,
}

impl Default for ConnectDefaults {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            statement_timeout: DEFAULT_STATEMENT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_open_connections: DEFAULT_OPEN_CONNECTIONS,
            max_idle_connections: DEFAULT_IDLE_CONNECTIONS,
            tunnel_server_selection_timeout: TUNNEL_SERVER_SELECTION_TIMEOUT,
        }
    }
}

impl ConnectDefaults {
    /// Resolve a seconds value from configuration, falling back when it is zero.
    pub fn seconds_or(value: u64, fallback: Duration) -> Duration {
        if value == 0 {
            fallback
        } else {
            Duration::from_secs(value)
        }
    }

    /// Resolve a connection count from configuration, falling back when it is zero.
    pub fn count_or(value: usize, fallback: usize) -> usize {
        if value == 0 { fallback } else { value }
    }

    /// The instant `budget` after `start`, capped at [`DEADLINE_CAP`] when the
    /// sum overflows.
    pub fn deadline(start: Instant, budget: Duration) -> Instant {
        start
            .checked_add(budget)
            .or_else(|| start.checked_add(DEADLINE_CAP))
            .unwrap_or(start)
    }

    /// Override the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Override the tunnel-mode server selection timeout.
    pub fn with_tunnel_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.tunnel_server_selection_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = ConnectDefaults::default();
        assert_eq!(defaults.connect_timeout, Duration::from_secs(3));
        assert_eq!(defaults.statement_timeout, Duration::from_secs(5));
        assert_eq!(defaults.max_open_connections, 10);
        assert_eq!(defaults.max_idle_connections, 10);
        assert_eq!(
            defaults.tunnel_server_selection_timeout,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_zero_falls_back() {
        assert_eq!(
            ConnectDefaults::seconds_or(0, DEFAULT_CONNECT_TIMEOUT),
            Duration::from_secs(3)
        );
        assert_eq!(
            ConnectDefaults::seconds_or(7, DEFAULT_CONNECT_TIMEOUT),
            Duration::from_secs(7)
        );
        assert_eq!(ConnectDefaults::count_or(0, 10), 10);
        assert_eq!(ConnectDefaults::count_or(50, 10), 50);
    }

    #[test]
    fn test_deadline_caps_overflowing_budget() {
        let start = Instant::now();
        assert_eq!(
            ConnectDefaults::deadline(start, Duration::from_secs(3)),
            start + Duration::from_secs(3)
        );

        let huge = ConnectDefaults::seconds_or(i64::MAX as u64, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(ConnectDefaults::deadline(start, huge), start + DEADLINE_CAP);
        assert_eq!(
            ConnectDefaults::deadline(start, Duration::MAX),
            start + DEADLINE_CAP
        );
    }
}
