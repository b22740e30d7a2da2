use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

use dns_lookup::{AddrInfoHints, SockType, getaddrinfo};
use mio::net::TcpListener;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("unable to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} resolved to no addresses")]
    NoAddress(String),
    #[error("unable to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}

/// Resolves the configured host and port.
///
/// A numeric port goes through the standard resolver. Anything else is a
/// service name (`http`, `https-alt`, ...) looked up with `getaddrinfo`.
pub fn resolve(cfg: &ServerConfig) -> Result<Vec<SocketAddr>, BindError> {
    let addr = cfg.listen_addr();
    let resolve_error = |source: io::Error| BindError::Resolve {
        addr: addr.clone(),
        source,
    };

    let addrs: Vec<SocketAddr> = match cfg.port.parse::<u16>() {
        Ok(port) => (cfg.host.as_str(), port)
            .to_socket_addrs()
            .map_err(resolve_error)?
            .collect(),
        Err(_) => {
            let hints = AddrInfoHints {
                socktype: SockType::Stream.into(),
                ..AddrInfoHints::default()
            };
            getaddrinfo(Some(cfg.host.as_str()), Some(cfg.port.as_str()), Some(hints))
                .map_err(|e| resolve_error(e.into()))?
                .filter_map(|info| info.ok())
                .map(|info| info.sockaddr)
                .collect()
        }
    };

    if addrs.is_empty() {
        return Err(BindError::NoAddress(addr));
    }
    Ok(addrs)
}

/// Binds a non-blocking listener on the first resolved address that works.
pub fn bind(cfg: &ServerConfig) -> Result<TcpListener, BindError> {
    let mut last_error = None;

    for addr in resolve(cfg)? {
        match TcpListener::bind(addr) {
            Ok(listener) => {
                info!("Listening on {}", addr);
                return Ok(listener);
            }
            Err(e) => {
                warn!(addr = %addr, error = %e, "Unable to bind address");
                last_error = Some(e);
            }
        }
    }

    Err(BindError::Bind {
        addr: cfg.listen_addr(),
        source: last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no address")),
    })
}
