//! SAUNA360 Heater/Panel Bus Protocol
//!
//! The heater and its control panel talk over a half-duplex RS-485 link at
//! 19200 baud, 8E1. This crate decodes that traffic and builds the packets
//! a third node on the bus uses to act like the panel.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────┬──────┬──────┬────────┬──────────┬─────────┬──────┐
//! │ SOF  │ ADDR │ TYPE │ CODE   │ DATA     │ CRC16   │ EOF  │
//! │ 0x98 │ 1B   │ 1B   │ 2B BE  │ 4B BE    │ 2B BE   │ 0x9C │
//! └──────┴──────┴──────┴────────┴──────────┴─────────┴──────┘
//! ```
//!
//! Everything between SOF and EOF is byte-stuffed with the escape byte
//! `0x91`, so SOF and EOF never appear inside a frame.

#![no_std]
#![deny(unsafe_code)]

pub mod crc;
pub mod frame;
pub mod packet;
pub mod registers;

pub use crc::crc16;
pub use frame::{
    encode_frame, EncodedFrame, FrameError, FrameParser, FRAME_EOF, FRAME_ESC, FRAME_SOF,
    MAX_FRAME_SIZE,
};
pub use packet::{Direction, Packet, PacketError, PANEL_ADDRESS};
pub use registers::Register;
