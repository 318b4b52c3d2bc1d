use std::net::ToSocketAddrs;

pub const DEFAULT_HOST: &str = "aprs.glidernet.org";
/// Server-side filtered feed.
pub const DEFAULT_PORT: u16 = 14580;

#[derive(Debug)]
pub enum ResolveError {
    Lookup {
        source: std::io::Error,
        host: String,
    },
    NoIpv4Address(String),
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Lookup { source, host } => {
                write!(f, "Failed to resolve '{host}': {source}")
            }
            ResolveError::NoIpv4Address(host) => write!(f, "'{host}' has no IPv4 address"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Lookup { source, .. } => Some(source),
            ResolveError::NoIpv4Address(_) => None,
        }
    }
}

/// Resolves `host` to its first IPv4 address with a single blocking lookup.
/// Failures are returned to the caller, never retried.
pub fn resolve_ipv4(host: &str) -> Result<std::net::Ipv4Addr, ResolveError> {
    let addresses = (host, 0)
        .to_socket_addrs()
        .map_err(|source| ResolveError::Lookup {
            source,
            host: host.to_string(),
        })?;

    addresses
        .filter_map(|address| match address {
            std::net::SocketAddr::V4(v4) => Some(*v4.ip()),
            std::net::SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ResolveError::NoIpv4Address(host.to_string()))
}
