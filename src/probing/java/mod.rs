//! Status probe over the modern Java TCP protocol: handshake, status
//! request, then a ping/pong exchange for the round-trip latency.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use thiserror::Error;

use self::status_json::RawJavaStatus;
use self::wire::{JavaValue, VarInt, WireError};
use super::Prober;

pub mod status_json;
pub mod wire;

/// Port a Java server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 25565;

/// Probe budget applied when the caller does not supply one. Bounds connect,
/// reads and writes; the connection never outlives it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Protocol number sent in the handshake. Status queries conventionally send
/// -1, which servers answer regardless of their own version.
pub const STATUS_PROTOCOL_VERSION: i32 = -1;

/// Everything a successful Java probe yields: the decoded status payload and
/// the measured ping/pong round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct JavaPing {
    pub status: RawJavaStatus,
    pub latency: Duration,
}

pub struct JavaProber {
    pub host: String,
    pub port: u16,
    pub protocol_version: i32,
    pub timeout: Duration,
}

impl JavaProber {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        JavaProber {
            host: host.into(),
            port,
            protocol_version: STATUS_PROTOCOL_VERSION,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Prober for JavaProber {
    type Response = JavaPing;

    type Error = JavaPingError;

    fn probe(&self) -> Result<Self::Response, Self::Error> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or(JavaPingError::Unresolvable)?;

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        trace!("connected to {} for a java status probe", addr);

        {
            let mut handshake = vec![];

            VarInt(0x00).write_to(&mut handshake)?;
            VarInt(self.protocol_version).write_to(&mut handshake)?;
            self.host.write_to(&mut handshake)?;
            handshake.write_u16::<BigEndian>(self.port)?;
            VarInt(1).write_to(&mut handshake)?; // next state: status

            wire::write_packet(&mut stream, &handshake)?;
        }

        wire::write_packet(&mut stream, &[0x00])?; // status request

        let packet_id = wire::read_packet_header(&mut stream)?;
        if packet_id != 0x00 {
            return Err(JavaPingError::WrongId {
                got: packet_id,
                expected: 0x00,
            });
        }

        let body = String::read_from(&mut stream)?;
        let status: RawJavaStatus = serde_json::from_str(&body)?;
        if status.players.is_none() {
            return Err(JavaPingError::MissingPlayers);
        }

        let payload = rand::random::<i64>();
        {
            let mut ping = vec![];

            VarInt(0x01).write_to(&mut ping)?;
            ping.write_i64::<BigEndian>(payload)?;

            wire::write_packet(&mut stream, &ping)?;
        }
        let start = Instant::now();

        let packet_id = wire::read_packet_header(&mut stream)?;
        let latency = start.elapsed();
        if packet_id != 0x01 {
            return Err(JavaPingError::WrongId {
                got: packet_id,
                expected: 0x01,
            });
        }
        let echoed = stream.read_i64::<BigEndian>()?;
        if echoed != payload {
            return Err(JavaPingError::PongMismatch {
                sent: payload,
                got: echoed,
            });
        }

        debug!(
            "java status probe of {}:{} answered in {:?}",
            self.host, self.port, latency
        );
        Ok(JavaPing { status, latency })
    }
}

#[derive(Error, Debug)]
pub enum JavaPingError {
    #[error("hostname resolved to no usable address")]
    Unresolvable,

    #[error("received wrong packet id {got:#04x}, expected {expected:#04x}")]
    WrongId { got: i32, expected: i32 },

    #[error("pong carried payload {got}, expected {sent}")]
    PongMismatch { sent: i64, got: i64 },

    #[error("status response carried no player information")]
    MissingPlayers,

    #[error("status response was not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    #[error("IO error during probe")]
    Io(#[from] io::Error),
}
