//! Packets carried inside bus frames
//!
//! A packet is 8 bytes: address, type, a 16-bit register code and a 32-bit
//! data word, both big-endian. The panel writes with types 0x07 and 0x09;
//! every other type is a report from the heater.

use crate::frame::{encode_frame, EncodedFrame, Frame, FrameError};
use crate::registers::Register;

/// Bus address the panel (and this driver) writes from
pub const PANEL_ADDRESS: u8 = 0x40;

/// Panel write packet type
pub const TYPE_PANEL_WRITE: u8 = 0x07;

/// Panel request packet type
pub const TYPE_PANEL_REQUEST: u8 = 0x09;

/// Size of a packet without CRC
pub const PACKET_SIZE: usize = 8;

/// Errors from packet decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Frame body shorter than a packet
    TooShort { len: usize },
}

/// Which way a packet travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Written by the control panel (or by us)
    PanelToHeater,
    /// Reported by the heater
    HeaterToPanel,
}

/// A decoded bus packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Source address
    pub address: u8,
    /// Packet type
    pub kind: u8,
    /// Register code
    pub code: u16,
    /// Register data word
    pub data: u32,
}

impl Packet {
    /// Build a panel write for `code`
    pub fn panel_write(code: u16, data: u32) -> Self {
        Self {
            address: PANEL_ADDRESS,
            kind: TYPE_PANEL_WRITE,
            code,
            data,
        }
    }

    /// Decode a packet from a verified frame
    ///
    /// Bytes after the first eight are ignored.
    pub fn from_frame(frame: &Frame) -> Result<Self, PacketError> {
        Self::from_bytes(&frame.payload)
    }

    /// Decode a packet from unescaped bytes without CRC
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < PACKET_SIZE {
            return Err(PacketError::TooShort { len: bytes.len() });
        }
        Ok(Self {
            address: bytes[0],
            kind: bytes[1],
            code: u16::from_be_bytes([bytes[2], bytes[3]]),
            data: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Serialize to the 8 packet bytes
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let code = self.code.to_be_bytes();
        let data = self.data.to_be_bytes();
        [
            self.address,
            self.kind,
            code[0],
            code[1],
            data[0],
            data[1],
            data[2],
            data[3],
        ]
    }

    /// Encode into a complete bus frame
    pub fn encode(&self) -> Result<EncodedFrame, FrameError> {
        encode_frame(&self.to_bytes())
    }

    /// Direction of travel, derived from the packet type
    pub fn direction(&self) -> Direction {
        match self.kind {
            TYPE_PANEL_WRITE | TYPE_PANEL_REQUEST => Direction::PanelToHeater,
            _ => Direction::HeaterToPanel,
        }
    }

    /// Register this packet addresses
    pub fn register(&self) -> Register {
        Register::from_code(self.code)
    }
}
