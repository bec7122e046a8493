use std::time::Duration;

/// Largest accepted message part unless configured otherwise (16 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Socket options applied before connect or bind.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Receive timeout. `None` blocks forever.
    pub read_timeout: Option<Duration>,
    /// Send timeout. `None` blocks forever.
    pub write_timeout: Option<Duration>,
    /// How long unsent messages are kept when the socket closes.
    pub linger: Duration,
    /// Largest inbound message part; larger ones drop the connection.
    /// `None` disables the limit.
    pub max_message_size: Option<usize>,
    /// Only queue messages on completed connections, so a send with no
    /// reachable kernel waits (and times out) instead of queueing.
    pub immediate: bool,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            linger: Duration::from_secs(1),
            max_message_size: Some(DEFAULT_MAX_MESSAGE_SIZE),
            immediate: true,
        }
    }
}

impl SocketConfig {
    /// Apply the same timeout to send and receive.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }

    pub(crate) fn apply(&self, socket: &zmq::Socket) -> zmq::Result<()> {
        socket.set_rcvtimeo(millis(self.read_timeout))?;
        socket.set_sndtimeo(millis(self.write_timeout))?;
        socket.set_linger(millis(Some(self.linger)))?;
        socket.set_maxmsgsize(
            self.max_message_size
                .map_or(-1, |size| i64::try_from(size).unwrap_or(i64::MAX)),
        )?;
        socket.set_immediate(self.immediate)?;
        Ok(())
    }
}

/// libzmq's millisecond convention: `-1` is infinite.
pub(crate) fn millis(duration: Option<Duration>) -> i32 {
    match duration {
        None => -1,
        Some(duration) => i32::try_from(duration.as_millis()).unwrap_or(i32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SocketConfig::default();
        assert_eq!(cfg.max_message_size, Some(DEFAULT_MAX_MESSAGE_SIZE));
        assert!(cfg.read_timeout.is_none());
        assert!(cfg.immediate);
    }

    #[test]
    fn with_timeout_sets_both_directions() {
        let cfg = SocketConfig::default().with_timeout(Duration::from_secs(2));
        assert_eq!(cfg.read_timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.write_timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn millis_conversion() {
        assert_eq!(millis(None), -1);
        assert_eq!(millis(Some(Duration::from_millis(1500))), 1500);
        assert_eq!(millis(Some(Duration::from_secs(u64::MAX))), i32::MAX);
    }

    #[test]
    fn options_reach_the_socket() {
        let ctx = zmq::Context::new();
        let socket = ctx.socket(zmq::REQ).unwrap();
        SocketConfig::default()
            .with_timeout(Duration::from_millis(750))
            .apply(&socket)
            .unwrap();

        assert_eq!(socket.get_rcvtimeo().unwrap(), 750);
        assert_eq!(socket.get_sndtimeo().unwrap(), 750);
        assert_eq!(socket.get_linger().unwrap(), 1000);
    }
}
