//! Shared fixtures: canned loopback servers speaking just enough of each
//! wire protocol to answer one status probe. The framing here is written out
//! byte by byte on purpose, so the fixtures do not trust the code under test
//! to frame its own expectations.

#![allow(dead_code)] // each test crate uses its own slice of these helpers

use std::io::Read;
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::thread;

pub const OFFLINE_MESSAGE_MAGIC: [u8; 16] = [
    0x00, 0xFF, 0xFF, 0x00, 0xFE, 0xFE, 0xFE, 0xFE, 0xFD, 0xFD, 0xFD, 0xFD, 0x12, 0x34, 0x56,
    0x78,
];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn write_varint(out: &mut Vec<u8>, mut value: i32) {
    loop {
        if (value & !0x7F) == 0 {
            out.push(value as u8);
            return;
        }
        out.push(((value & 0x7F) | 0x80) as u8);
        value = ((value as u32) >> 7) as i32;
    }
}

pub fn read_varint(stream: &mut impl Read) -> Option<i32> {
    let mut value = 0;
    let mut position = 0;
    loop {
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).ok()?;
        let current = byte[0] as i32;
        value |= (current & 0x7F) << position;
        if current & 0x80 == 0 {
            return Some(value);
        }
        position += 7;
    }
}

pub fn read_packet(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let length = read_varint(stream)?;
    let mut body = vec![0; length as usize];
    stream.read_exact(&mut body).ok()?;
    Some(body)
}

pub fn write_packet(stream: &mut TcpStream, body: &[u8]) {
    use std::io::Write;

    let mut framed = Vec::new();
    write_varint(&mut framed, body.len() as i32);
    framed.extend_from_slice(body);
    stream.write_all(&framed).unwrap();
}

/// Binds an ephemeral TCP port and serves exactly one Java status exchange:
/// handshake, status request/response, ping/pong echo. Returns the port.
pub fn spawn_java_server(status_json: String) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let handshake = read_packet(&mut stream).expect("handshake packet");
        assert_eq!(handshake[0], 0x00, "first packet must be the handshake");

        let request = read_packet(&mut stream).expect("status request packet");
        assert_eq!(request, [0x00], "second packet must be the status request");

        let mut response = Vec::new();
        write_varint(&mut response, 0x00);
        write_varint(&mut response, status_json.len() as i32);
        response.extend_from_slice(status_json.as_bytes());
        write_packet(&mut stream, &response);

        // a prober that rejects the status hangs up without pinging
        if let Some(ping) = read_packet(&mut stream) {
            assert_eq!(ping[0], 0x01, "third packet must be the ping");
            write_packet(&mut stream, &ping); // the pong echoes the payload
        }
    });

    port
}

/// Binds an ephemeral TCP port that accepts and then never answers anything.
pub fn spawn_unresponsive_tcp_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut sink = Vec::new();
        // exits once the probe gives up and hangs up
        let _ = stream.read_to_end(&mut sink);
    });

    port
}

/// A TCP port with nothing listening on it.
pub fn refused_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// A UDP port with nothing listening on it.
pub fn refused_udp_port() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();
    drop(socket);
    port
}

/// Binds an ephemeral UDP port and answers one unconnected ping with a pong
/// advertising `advertisement`. Returns the port.
pub fn spawn_bedrock_server(advertisement: String) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = socket.local_addr().unwrap().port();

    thread::spawn(move || {
        let mut buf = [0u8; 1500];
        let (read, peer) = socket.recv_from(&mut buf).unwrap();
        let ping = &buf[..read];
        assert_eq!(ping[0], 0x01, "expected an unconnected ping");

        let mut pong = vec![0x1C];
        pong.extend_from_slice(&ping[1..9]); // echo the timestamp
        pong.extend_from_slice(&424242i64.to_be_bytes()); // server guid
        pong.extend_from_slice(&OFFLINE_MESSAGE_MAGIC);
        pong.extend_from_slice(&(advertisement.len() as u16).to_be_bytes());
        pong.extend_from_slice(advertisement.as_bytes());

        socket.send_to(&pong, peer).unwrap();
    });

    port
}
