//! The unified status record and the normalization of raw probe outcomes
//! into it.
//!
//! This is the single place a failed probe turns into the canonical offline
//! record: probes report their errors honestly, and everything absorbed here
//! is logged rather than surfaced. Only a favicon violating the data-URL
//! contract escapes as an error.

use std::time::{Duration, SystemTime};

use log::debug;
use serde::Serialize;

use crate::favicon::{self, FaviconError};
use crate::probing::bedrock::{BedrockPingError, RawBedrockStatus};
use crate::probing::java::{JavaPing, JavaPingError};

/// Reachability verdict for a probed server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServerState {
    Online,
    Offline,
}

/// The normalized outcome of one status probe, identical in shape for both
/// editions. A value type: built once per probe and never mutated after it
/// is handed out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerStatus {
    pub state: ServerState,
    /// Zero when the probe failed outright.
    pub max_players: u32,
    /// Zero when the probe failed outright.
    pub online_players: u32,
    pub version: Option<String>,
    /// Round trip of the ping/pong exchange; never present for Bedrock,
    /// whose wire protocol does not expose one at this level.
    pub latency: Option<Duration>,
    /// Raw message of the day. May contain legacy `§`-style colour codes;
    /// stripping them is the renderer's business.
    pub motd: Option<String>,
    /// Raw image bytes from the server's data-URL favicon; Java only.
    pub favicon: Option<Vec<u8>>,
    /// When normalization ran, success or failure.
    pub probed_at: SystemTime,
}

impl ServerStatus {
    /// Canonical record for a target that could not be probed: zeroed counts
    /// and no optional fields.
    pub fn offline() -> Self {
        ServerStatus {
            state: ServerState::Offline,
            max_players: 0,
            online_players: 0,
            version: None,
            latency: None,
            motd: None,
            favicon: None,
            probed_at: SystemTime::now(),
        }
    }
}

/// The shared online rule: a server that answered is still only Online when
/// it reports room for players and its version string does not flag it as
/// offline. A reported status failing this rule keeps its fields; only a
/// failed probe zeroes the record.
fn determine_state(max_players: u32, version: &str) -> ServerState {
    if max_players != 0 && !version.to_ascii_lowercase().contains("offline") {
        ServerState::Online
    } else {
        ServerState::Offline
    }
}

pub(crate) fn normalize_java(
    outcome: Result<JavaPing, JavaPingError>,
) -> Result<ServerStatus, FaviconError> {
    let ping = match outcome {
        Ok(ping) => ping,
        Err(err) => {
            debug!("java probe failed, reporting offline: {}", err);
            return Ok(ServerStatus::offline());
        }
    };

    let players = match ping.status.players {
        Some(ref players) => players,
        // the prober already rejects these; handled again so the match
        // stays total
        None => {
            debug!("java status carried no player information, reporting offline");
            return Ok(ServerStatus::offline());
        }
    };

    let favicon = ping
        .status
        .favicon
        .as_deref()
        .map(favicon::decode_data_url)
        .transpose()?;

    Ok(ServerStatus {
        state: determine_state(players.max, &ping.status.version.name),
        max_players: players.max,
        online_players: players.online,
        version: Some(ping.status.version.name.clone()),
        latency: Some(ping.latency),
        motd: ping.status.motd(),
        favicon,
        probed_at: SystemTime::now(),
    })
}

pub(crate) fn normalize_bedrock(
    outcome: Result<RawBedrockStatus, BedrockPingError>,
) -> ServerStatus {
    let raw = match outcome {
        Ok(raw) => raw,
        Err(err) => {
            debug!("bedrock probe failed, reporting offline: {}", err);
            return ServerStatus::offline();
        }
    };

    ServerStatus {
        state: determine_state(raw.players_max, &raw.version),
        max_players: raw.players_max,
        online_players: raw.players_online,
        motd: (!raw.motd.is_empty()).then(|| raw.motd),
        version: Some(raw.version),
        latency: None,
        favicon: None,
        probed_at: SystemTime::now(),
    }
}
