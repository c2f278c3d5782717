//! Parsing and formatting of `host[:port]` server address strings.

use std::fmt;

use serde::Serialize;

use crate::Edition;

/// A parsed server address. The host is never empty; the port is only absent
/// when none was supplied and no edition was known to default it from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: Option<u16>,
}

impl ServerAddress {
    /// Parses a free-form address string, best effort: trims and lowercases,
    /// splits off an optional `:port`, and falls back to `localhost` for an
    /// empty host. A port that does not parse as a positive 16-bit integer is
    /// treated as unsupplied; an unsupplied port takes the edition's default
    /// when an edition is given. Never fails.
    pub fn parse(raw: &str, edition: Option<Edition>) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        let mut segments = normalized.split(':');

        let host = match segments.next() {
            None | Some("") => "localhost".to_owned(),
            Some(host) => host.to_owned(),
        };

        let port = segments
            .next()
            .and_then(|segment| segment.parse::<u16>().ok())
            .filter(|&port| port > 0)
            .or_else(|| edition.map(Edition::default_port));

        ServerAddress { host, port }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}
