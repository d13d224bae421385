use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Well-known port of the control protocol
pub const DEFAULT_PORT: u16 = 1710;

/// Connection settings shared by every request a client makes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DspConfig {
    /// TCP port of the control protocol
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for each frame read, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Deadline for the TCP connect, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Largest frame accepted from the device, in bytes
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_frame_len() -> usize {
    1024 * 1024
}

/// Milliseconds in `timeout`, rounded up and never zero
fn whole_millis(timeout: Duration) -> u64 {
    let nanos = timeout.as_nanos().max(1);
    u64::try_from(nanos.div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            read_timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_timeout_ms(),
            max_frame_len: default_max_frame_len(),
        }
    }
}

impl DspConfig {
    /// Use a different control port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-frame read deadline
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = whole_millis(timeout);
        self
    }

    /// Set the connect deadline
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = whole_millis(timeout);
        self
    }

    /// Set the largest accepted frame
    pub fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DspConfig::default();
        assert_eq!(config.port, 1710);
        assert_eq!(config.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DspConfig = serde_json::from_str(r#"{"read_timeout_ms": 500}"#).unwrap();
        assert_eq!(config.port, 1710);
        assert_eq!(config.read_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_frame_len, 1024 * 1024);
    }

    #[test]
    fn test_sub_millisecond_timeouts_round_up() {
        let config = DspConfig::default()
            .with_read_timeout(Duration::from_micros(200))
            .with_connect_timeout(Duration::ZERO);
        assert_eq!(config.read_timeout(), Duration::from_millis(1));
        assert_eq!(config.connect_timeout(), Duration::from_millis(1));

        let config = DspConfig::default().with_read_timeout(Duration::from_micros(1500));
        assert_eq!(config.read_timeout_ms, 2);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = DspConfig::default().with_read_timeout(Duration::MAX);
        assert_eq!(config.read_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_builders() {
        let config = DspConfig::default()
            .with_port(9000)
            .with_read_timeout(Duration::from_millis(250));
        assert_eq!(config.port, 9000);
        assert_eq!(config.read_timeout_ms, 250);
    }
}
