//! Status probe over the Bedrock UDP protocol: one RakNet unconnected ping,
//! one unconnected pong carrying the server's advertisement string.

use std::io::{self, ErrorKind, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::str::Split;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::{debug, trace};
use serde::Serialize;
use thiserror::Error;

use super::Prober;

/// Port a Bedrock server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 19132;

/// Read/write bound applied when the caller does not supply one. The
/// underlying socket has no timeout of its own, so the probe always sets an
/// explicit one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// RakNet offline-message marker carried by unconnected pings and pongs.
const OFFLINE_MESSAGE_MAGIC: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56,
    0x78,
];

const UNCONNECTED_PING: u8 = 0x01;
const UNCONNECTED_PONG: u8 = 0x1C;

// packet id + timestamp + server guid + magic + advertisement length
const PONG_HEADER_LEN: usize = 35;

/// The advertisement a Bedrock server answers an unconnected ping with,
/// split out of its semicolon-separated wire form.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RawBedrockStatus {
    pub edition: String,
    pub motd: String,
    pub protocol_version: String,
    pub version: String,
    pub players_online: u32,
    pub players_max: u32,
    pub server_guid: Option<String>,
    pub level_name: Option<String>,
    pub gamemode: Option<String>,
}

impl RawBedrockStatus {
    /// Parses the advertisement string. The first six fields (through the
    /// max player count) are required; servers differ in how many trailing
    /// fields they append.
    fn parse(advertisement: &str) -> Result<Self, BedrockPingError> {
        let malformed = || BedrockPingError::BadAdvertisement(advertisement.to_owned());
        let next = |fields: &mut Split<char>| fields.next().map(str::to_owned);

        let mut fields = advertisement.split(';');

        let edition = next(&mut fields).ok_or_else(malformed)?;
        let motd = next(&mut fields).ok_or_else(malformed)?;
        let protocol_version = next(&mut fields).ok_or_else(malformed)?;
        let version = next(&mut fields).ok_or_else(malformed)?;
        let players_online = next(&mut fields)
            .and_then(|count| count.parse().ok())
            .ok_or_else(malformed)?;
        let players_max = next(&mut fields)
            .and_then(|count| count.parse().ok())
            .ok_or_else(malformed)?;

        let server_guid = next(&mut fields);
        let level_name = next(&mut fields);
        let gamemode = next(&mut fields);

        Ok(RawBedrockStatus {
            edition,
            motd,
            protocol_version,
            version,
            players_online,
            players_max,
            server_guid,
            level_name,
            gamemode,
        })
    }
}

fn decode_pong(datagram: &[u8]) -> Result<RawBedrockStatus, BedrockPingError> {
    if datagram.len() < PONG_HEADER_LEN {
        return Err(BedrockPingError::Truncated);
    }
    if datagram[0] != UNCONNECTED_PONG {
        return Err(BedrockPingError::WrongId(datagram[0]));
    }
    // bytes 1..17 hold the echoed timestamp and the server guid; neither
    // matters to the status
    if datagram[17..33] != OFFLINE_MESSAGE_MAGIC[..] {
        return Err(BedrockPingError::BadMagic);
    }

    let advertised = BigEndian::read_u16(&datagram[33..35]) as usize;
    let advertisement = datagram[PONG_HEADER_LEN..]
        .get(..advertised)
        .ok_or(BedrockPingError::Truncated)?;

    RawBedrockStatus::parse(&String::from_utf8_lossy(advertisement))
}

fn wall_clock_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub struct BedrockProber {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
}

impl BedrockProber {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        BedrockProber {
            host: host.into(),
            port,
            read_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Prober for BedrockProber {
    type Response = RawBedrockStatus;

    type Error = BedrockPingError;

    fn probe(&self) -> Result<Self::Response, Self::Error> {
        let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
        socket.connect((self.host.as_str(), self.port))?;
        socket.set_read_timeout(Some(self.read_timeout))?;
        socket.set_write_timeout(Some(self.read_timeout))?;

        let mut ping = Vec::with_capacity(33);
        ping.write_u8(UNCONNECTED_PING)?;
        ping.write_i64::<BigEndian>(wall_clock_millis())?;
        ping.write_all(&OFFLINE_MESSAGE_MAGIC)?;
        ping.write_i64::<BigEndian>(rand::random())?; // client guid

        socket.send(&ping)?;
        trace!("sent unconnected ping to {}:{}", self.host, self.port);

        let mut buf = [0; 1500];
        let read = match socket.recv(&mut buf) {
            Ok(read) => read,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                return Err(BedrockPingError::TimeoutReached)
            }
            Err(e) => return Err(BedrockPingError::Io(e)),
        };

        let status = decode_pong(&buf[..read])?;
        debug!(
            "bedrock probe of {}:{} answered: {}/{} players",
            self.host, self.port, status.players_online, status.players_max
        );
        Ok(status)
    }
}

#[derive(Error, Debug)]
pub enum BedrockPingError {
    #[error("timeout reached awaiting the pong")]
    TimeoutReached,

    #[error("received wrong packet id {0:#04x}, expected 0x1c")]
    WrongId(u8),

    #[error("pong did not carry the offline-message magic")]
    BadMagic,

    #[error("pong was shorter than its own framing claims")]
    Truncated,

    #[error("malformed server advertisement: {0:?}")]
    BadAdvertisement(String),

    #[error("IO error during probe")]
    Io(#[from] io::Error),
}
