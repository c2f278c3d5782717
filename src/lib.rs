//! Status probing for Minecraft servers of either edition.
//!
//! Given a server address and an [`Edition`], [`query`] performs one status
//! probe over that edition's wire protocol — the TCP status handshake for
//! Java, the RakNet unconnected ping for Bedrock — and folds the reply into
//! one normalized [`ServerStatus`]: reachability, player counts, version,
//! message of the day, round-trip latency (Java only) and the raw favicon
//! bytes when the server sends one.
//!
//! Unreachable or misbehaving servers do not surface as errors; they come
//! back as the offline record. The only hard failures are a favicon that
//! violates the data-URL contract and an edition selector outside the
//! supported set.
//!
//! ```no_run
//! use mcstatus::{query, Edition, QueryOptions};
//!
//! let status = query(QueryOptions::new("play.example.com", Edition::Java))?;
//! println!("{}/{} players", status.online_players, status.max_players);
//! # Ok::<(), mcstatus::FaviconError>(())
//! ```
//!
//! Each call is independent: one socket, one budget, no shared state, so
//! concurrent queries need no coordination. Retries are the caller's
//! business.

pub mod address;
pub mod favicon;
pub mod probing;
pub mod status;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::probing::bedrock::BedrockProber;
use crate::probing::java::JavaProber;
use crate::probing::Prober;

pub use crate::address::ServerAddress;
pub use crate::favicon::FaviconError;
pub use crate::status::{ServerState, ServerStatus};

/// The two incompatible server protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edition {
    /// Java edition: TCP status handshake on port 25565.
    Java,
    /// Bedrock edition: UDP unconnected ping on port 19132.
    Bedrock,
}

impl Edition {
    /// Port servers of this edition listen on unless told otherwise.
    pub fn default_port(self) -> u16 {
        match self {
            Edition::Java => probing::java::DEFAULT_PORT,
            Edition::Bedrock => probing::bedrock::DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Edition::Java => "java",
            Edition::Bedrock => "bedrock",
        })
    }
}

impl FromStr for Edition {
    type Err = UnsupportedEditionError;

    /// Accepts the selector strings presentation layers pass around,
    /// case-insensitively. Anything else is a hard failure: an unknown
    /// selector is a caller bug, not a reachability condition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "java" => Ok(Edition::Java),
            "bedrock" => Ok(Edition::Bedrock),
            _ => Err(UnsupportedEditionError(s.to_owned())),
        }
    }
}

/// An edition selector outside the supported set.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("unsupported server edition {0:?}, expected \"java\" or \"bedrock\"")]
pub struct UnsupportedEditionError(String);

/// Everything one status query needs. Built either directly or from a raw
/// address string via [`QueryOptions::new`]; consumed by [`query`].
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub edition: Edition,
    pub host: String,
    pub port: Option<u16>,
    /// Probe budget. Honored by the Java path; the Bedrock prober carries
    /// its own explicit read bound instead.
    pub timeout: Option<Duration>,
}

impl QueryOptions {
    /// Parses `address` with the edition's default port and pairs it with
    /// the edition.
    pub fn new(address: &str, edition: Edition) -> Self {
        let parsed = ServerAddress::parse(address, Some(edition));
        QueryOptions {
            edition,
            host: parsed.host,
            port: parsed.port,
            timeout: None,
        }
    }
}

/// Queries one server and returns its normalized status.
///
/// Pure routing: picks the prober for the requested edition, runs it, and
/// hands the outcome to the normalizer. Network failures of any kind come
/// back as the offline [`ServerStatus`], never as an error; the one failure
/// this can return is a served favicon that violates the data-URL contract.
pub fn query(options: QueryOptions) -> Result<ServerStatus, FaviconError> {
    debug!(
        "querying {} server at {}:{}",
        options.edition,
        options.host,
        options.port.unwrap_or_else(|| options.edition.default_port())
    );

    match options.edition {
        Edition::Java => {
            let prober = JavaProber {
                host: options.host,
                port: options.port.unwrap_or(probing::java::DEFAULT_PORT),
                protocol_version: probing::java::STATUS_PROTOCOL_VERSION,
                timeout: options.timeout.unwrap_or(probing::java::DEFAULT_TIMEOUT),
            };
            status::normalize_java(prober.probe())
        }
        Edition::Bedrock => {
            let prober = BedrockProber {
                host: options.host,
                port: options.port.unwrap_or(probing::bedrock::DEFAULT_PORT),
                read_timeout: probing::bedrock::DEFAULT_TIMEOUT,
            };
            Ok(status::normalize_bedrock(prober.probe()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edition_selectors_parse_case_insensitively() {
        assert_eq!("JAVA".parse::<Edition>().unwrap(), Edition::Java);
        assert_eq!("bedrock".parse::<Edition>().unwrap(), Edition::Bedrock);
        assert_eq!(" Java ".parse::<Edition>().unwrap(), Edition::Java);
    }

    #[test]
    fn unknown_edition_selectors_fail_hard() {
        let err = "pocket".parse::<Edition>().unwrap_err();
        assert_eq!(err, UnsupportedEditionError("pocket".to_owned()));
    }

    #[test]
    fn editions_know_their_default_ports() {
        assert_eq!(Edition::Java.default_port(), 25565);
        assert_eq!(Edition::Bedrock.default_port(), 19132);
    }

    #[test]
    fn options_pick_up_the_parsed_address() {
        let options = QueryOptions::new("Play.Example.com:1234", Edition::Java);
        assert_eq!(options.host, "play.example.com");
        assert_eq!(options.port, Some(1234));
        assert_eq!(options.timeout, None);

        let defaulted = QueryOptions::new("play.example.com", Edition::Bedrock);
        assert_eq!(defaulted.port, Some(19132));
    }
}
