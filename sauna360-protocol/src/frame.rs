//! Frame encoding and decoding for the heater bus.
//!
//! Frame format:
//! - SOF (1 byte): 0x98
//! - BODY: packet bytes followed by the CRC-16 (big-endian), byte-stuffed
//! - EOF (1 byte): 0x9C
//!
//! Byte stuffing replaces SOF, EOF and ESC inside the body with ESC plus a
//! code byte:
//!
//! | Byte | Sent as   |
//! |------|-----------|
//! | 0x9C | 0x91 0x63 |
//! | 0x98 | 0x91 0x67 |
//! | 0x91 | 0x91 0x6E |

use heapless::Vec;

use crate::crc::crc16;

/// Start of frame
pub const FRAME_SOF: u8 = 0x98;

/// End of frame
pub const FRAME_EOF: u8 = 0x9C;

/// Escape byte
pub const FRAME_ESC: u8 = 0x91;

const ESC_CODE_EOF: u8 = 0x63;
const ESC_CODE_SOF: u8 = 0x67;
const ESC_CODE_ESC: u8 = 0x6E;

/// Maximum unescaped body size (packet + CRC)
pub const MAX_BODY_SIZE: usize = 16;

/// Maximum encoded frame size (every body byte escaped)
pub const MAX_FRAME_SIZE: usize = 2 + 2 * MAX_BODY_SIZE;

/// Frames shorter than this many raw bytes (SOF and EOF included) are
/// bus noise and dropped without a CRC check
pub const MIN_FRAME_SIZE: usize = 7;

const CRC_SIZE: usize = 2;

/// An encoded frame ready to be written to the UART
pub type EncodedFrame = Vec<u8, MAX_FRAME_SIZE>;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Checksum mismatch
    InvalidCrc {
        /// CRC carried by the frame
        received: u16,
        /// CRC computed over the frame body
        computed: u16,
    },
    /// Frame body exceeded the receive buffer
    Overflow,
    /// Frame body too short to carry a CRC
    TooShort,
    /// Payload too large to encode
    PayloadTooLarge,
}

/// A received frame with its CRC verified and stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Unescaped body without the CRC
    pub payload: Vec<u8, MAX_BODY_SIZE>,
    /// Escape code that had no defined meaning, if one was seen
    ///
    /// Such codes decode to 0x91 and the frame is still checked against
    /// its CRC.
    pub unknown_escape: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for SOF, bytes are discarded
    Idle,
    /// Collecting body bytes
    InFrame,
    /// Previous byte was ESC
    Escaped,
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_BODY_SIZE>,
    raw_len: usize,
    unknown_escape: Option<u8>,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
            buffer: Vec::new(),
            raw_len: 0,
            unknown_escape: None,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.buffer.clear();
        self.raw_len = 0;
        self.unknown_escape = None;
    }

    /// Check whether the parser is inside a frame
    pub fn in_frame(&self) -> bool {
        self.state != ParseState::Idle
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed (or a noise frame was dropped),
    /// or `Err` on a bad frame.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match byte {
            FRAME_SOF => {
                // SOF always restarts, even mid-frame
                self.reset();
                self.state = ParseState::InFrame;
                self.raw_len = 1;
                Ok(None)
            }
            FRAME_EOF => {
                if self.state == ParseState::Idle {
                    return Ok(None);
                }
                self.raw_len += 1;
                let result = self.finish();
                self.reset();
                result
            }
            _ => match self.state {
                ParseState::Idle => Ok(None),
                ParseState::InFrame => {
                    self.raw_len += 1;
                    if byte == FRAME_ESC {
                        self.state = ParseState::Escaped;
                        Ok(None)
                    } else {
                        self.push(byte)
                    }
                }
                ParseState::Escaped => {
                    self.raw_len += 1;
                    self.state = ParseState::InFrame;
                    let decoded = match byte {
                        ESC_CODE_EOF => FRAME_EOF,
                        ESC_CODE_SOF => FRAME_SOF,
                        ESC_CODE_ESC => FRAME_ESC,
                        other => {
                            self.unknown_escape = Some(other);
                            FRAME_ESC
                        }
                    };
                    self.push(decoded)
                }
            },
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn push(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        if self.buffer.push(byte).is_err() {
            self.reset();
            return Err(FrameError::Overflow);
        }
        Ok(None)
    }

    fn finish(&mut self) -> Result<Option<Frame>, FrameError> {
        if self.raw_len < MIN_FRAME_SIZE {
            return Ok(None);
        }
        if self.buffer.len() < CRC_SIZE {
            return Err(FrameError::TooShort);
        }

        let body_len = self.buffer.len() - CRC_SIZE;
        let received = u16::from_be_bytes([self.buffer[body_len], self.buffer[body_len + 1]]);
        let computed = crc16(&self.buffer[..body_len]);
        if received != computed {
            return Err(FrameError::InvalidCrc { received, computed });
        }

        let mut payload = Vec::new();
        payload
            .extend_from_slice(&self.buffer[..body_len])
            .map_err(|_| FrameError::Overflow)?;

        Ok(Some(Frame {
            payload,
            unknown_escape: self.unknown_escape,
        }))
    }
}

/// Build a complete frame around `payload`: SOF, escaped payload and CRC, EOF
pub fn encode_frame(payload: &[u8]) -> Result<EncodedFrame, FrameError> {
    if payload.len() + CRC_SIZE > MAX_BODY_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }

    let crc = crc16(payload).to_be_bytes();
    let mut frame = EncodedFrame::new();
    push_raw(&mut frame, FRAME_SOF)?;
    for &byte in payload.iter().chain(crc.iter()) {
        push_escaped(&mut frame, byte)?;
    }
    push_raw(&mut frame, FRAME_EOF)?;
    Ok(frame)
}

fn push_raw(frame: &mut EncodedFrame, byte: u8) -> Result<(), FrameError> {
    frame.push(byte).map_err(|_| FrameError::PayloadTooLarge)
}

fn push_escaped(frame: &mut EncodedFrame, byte: u8) -> Result<(), FrameError> {
    let code = match byte {
        FRAME_EOF => ESC_CODE_EOF,
        FRAME_SOF => ESC_CODE_SOF,
        FRAME_ESC => ESC_CODE_ESC,
        _ => return push_raw(frame, byte),
    };
    push_raw(frame, FRAME_ESC)?;
    push_raw(frame, code)
}
