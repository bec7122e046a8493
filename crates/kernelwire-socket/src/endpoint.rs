/// `tcp://host:port`, the form connection files describe.
pub fn tcp_endpoint(host: &str, port: u16) -> String {
    format!("tcp://{host}:{port}")
}

/// Port of a bound or connected TCP endpoint such as `tcp://127.0.0.1:5555`.
pub fn port_of(endpoint: &str) -> Option<u16> {
    let (_, port) = endpoint.rsplit_once(':')?;
    port.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tcp_endpoint() {
        assert_eq!(tcp_endpoint("127.0.0.1", 5555), "tcp://127.0.0.1:5555");
    }

    #[test]
    fn extracts_port() {
        assert_eq!(port_of("tcp://127.0.0.1:50321"), Some(50321));
        assert_eq!(port_of("tcp://[::1]:9000"), Some(9000));
        assert_eq!(port_of("tcp://127.0.0.1:*"), None);
        assert_eq!(port_of("inproc"), None);
    }
}
