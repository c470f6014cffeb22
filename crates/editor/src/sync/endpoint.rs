//! Local vs deployed backend selection

/// Which backend deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Local,
    Deployed,
}

impl Endpoint {
    /// Local for loopback / unnamed hosts, deployed otherwise
    pub fn for_host(host: &str) -> Self {
        let host = host.trim().to_ascii_lowercase();
        let host = strip_port(&host);
        let local = host.is_empty()
            || host == "localhost"
            || host == "0.0.0.0"
            || host == "::1"
            || host == "[::1]"
            || host.starts_with("127.")
            || host.ends_with(".localhost")
            || host.ends_with(".local");
        if local {
            Endpoint::Local
        } else {
            Endpoint::Deployed
        }
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // [::1]:5173
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_hosts() {
        for host in ["", "localhost", "localhost:5173", "127.0.0.1", "[::1]:3000", "::1", "dev.local"] {
            assert_eq!(Endpoint::for_host(host), Endpoint::Local, "{host}");
        }
    }

    #[test]
    fn test_deployed_hosts() {
        for host in ["floorplan.vercel.app", "example.com:443", "10.0.0.4"] {
            assert_eq!(Endpoint::for_host(host), Endpoint::Deployed, "{host}");
        }
    }
}
