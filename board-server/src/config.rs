//! Server configuration from flags and environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use url::Url;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default realtime model the minted sessions are bound to.
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2025-06-03";

/// Default upstream API base.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com";

/// Mathboard backend configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "mathboard-server", version, about = "Mathboard realtime session backend")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(long, env = "BOARD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, env = "BOARD_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Base URL of the realtime API.
    #[arg(long, env = "BOARD_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: Url,

    /// Realtime model requested for minted sessions.
    #[arg(long, env = "BOARD_REALTIME_MODEL", default_value = DEFAULT_REALTIME_MODEL)]
    pub model: String,
}

impl ServerConfig {
    /// Socket address to bind.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}
