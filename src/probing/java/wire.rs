//! Primitives of the modern Java wire format: VarInts, length-prefixed
//! strings and length-framed packets.

use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// Longest length-prefixed string the probe accepts. Status payloads stay in
/// the low kilobytes even with a favicon attached; a larger announced length
/// means a hostile or broken peer and must not drive an allocation.
const MAX_STRING_LEN: i32 = 1 << 21;

/// A value with a defined encoding in the Java protocol.
pub trait JavaValue: Sized {
    fn read_from(data: &mut impl Read) -> Result<Self, WireError>;

    fn write_to(&self, target: &mut impl Write) -> Result<(), WireError>;
}

/// Variable-width integer, seven payload bits per byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub i32);

impl VarInt {
    const SEGMENT_BITS: i32 = 0x7F;
    const CONTINUE_BIT: i32 = 0x80;
    const MAX_BITS: i32 = 32;
}

impl JavaValue for VarInt {
    fn read_from(data: &mut impl Read) -> Result<Self, WireError> {
        let mut value = 0;
        let mut position = 0;
        loop {
            let current = data.read_u8()? as i32;
            value |= (current & Self::SEGMENT_BITS) << position;
            if (current & Self::CONTINUE_BIT) == 0 {
                return Ok(Self(value));
            }
            position += 7;
            if position >= Self::MAX_BITS {
                return Err(WireError::VarIntTooLong);
            }
        }
    }

    fn write_to(&self, target: &mut impl Write) -> Result<(), WireError> {
        let mut value = self.0;
        loop {
            if (value & !Self::SEGMENT_BITS) == 0 {
                target.write_u8(value as u8)?;
                return Ok(());
            }

            target.write_u8(((value & Self::SEGMENT_BITS) | Self::CONTINUE_BIT) as u8)?;

            // logical shift so negative values terminate
            value = ((value as u32) >> 7) as i32;
        }
    }
}

impl JavaValue for String {
    fn read_from(data: &mut impl Read) -> Result<Self, WireError> {
        let len = VarInt::read_from(data)?.0;
        if !(0..=MAX_STRING_LEN).contains(&len) {
            return Err(WireError::BadStringLength(len));
        }

        let mut string_data = vec![0; len as usize];
        data.read_exact(&mut string_data)?;

        Ok(String::from_utf8_lossy(&string_data).into_owned())
    }

    fn write_to(&self, target: &mut impl Write) -> Result<(), WireError> {
        let string_data = self.as_bytes();

        VarInt(string_data.len() as i32).write_to(target)?;
        target.write_all(string_data)?;
        Ok(())
    }
}

/// Frames `body` with its VarInt length and writes the whole packet.
pub fn write_packet(target: &mut impl Write, body: &[u8]) -> Result<(), WireError> {
    VarInt(body.len() as i32).write_to(target)?;
    target.write_all(body)?;
    Ok(())
}

/// Reads a packet's VarInt frame length and packet id, returning the id.
pub fn read_packet_header(data: &mut impl Read) -> Result<i32, WireError> {
    let _length = VarInt::read_from(data)?;
    let id = VarInt::read_from(data)?;
    Ok(id.0)
}

#[derive(Error, Debug)]
pub enum WireError {
    #[error("VarInt ran past 32 bits")]
    VarIntTooLong,

    #[error("string length {0} outside the accepted range")]
    BadStringLength(i32),

    #[error("IO error")]
    Io(#[from] io::Error),
}
