//! This crate provides a `no-std` framing layer for relaying CAN messages over a serial link.
//! # Usage
//! ### Message Packing
//! ```rust
//! use serial_can::{CrcMode, Message};
//!
//! let mut message = Message::new(0xFF, 6, CrcMode::Crc8).unwrap();
//! message.pack_values(&[0x15u16, 0xE2]).unwrap();
//! assert_eq!(&message.payload()[..4], &[0x15, 0x00, 0xE2, 0x00]);
//!
//! // With crc enabled only 6 bytes are available
//! assert!(message.pack_values(&[0u32, 0]).is_err());
//! ```
//! ### Frame Serialization
//! ```rust
//! use serial_can::{CrcMode, Message, MAX_FRAME_LEN};
//!
//! let mut message = Message::new(0xFF, 6, CrcMode::None).unwrap();
//! message.pack_text(b"test").unwrap();
//!
//! let mut buf = [0u8; MAX_FRAME_LEN];
//! let len = message.encode_frame(1, &mut buf);
//! assert_eq!(
//!     &buf[..len],
//!     &[0xAA, 1, 0, 0, 0, 6, 0xFF, 0, 0, 0, b't', b'e', b's', b't', 0, 0, 0xBB]
//! );
//! ```
//! ### Frame Parsing
//! ```rust
//! use serial_can::{CrcMode, FrameReader, Message, ReaderConfig};
//!
//! let data = [0xAA, 1, 0, 0, 0, 2, 0x23, 0x01, 0, 0, 0x11, 0x22, 0xBB];
//! let mut reader = FrameReader::new(ReaderConfig::default());
//! let mut message = Message::new(0, 2, CrcMode::None).unwrap();
//! for result in reader.iter_frames(&data) {
//!     let frame = result.unwrap();
//!     message.load(&frame).unwrap();
//! }
//! assert_eq!(message.identifier(), 0x123);
//! assert_eq!(message.data(), &[0x11, 0x22]);
//! ```

#![no_std]

mod buffer;

mod crc8;
pub use crc8::*;

mod error;
pub use error::*;

mod message;
pub use message::*;

mod raw_frame;
pub use raw_frame::*;

mod reader;
pub use reader::*;

mod transceiver;
pub use transceiver::*;

/// Byte marking the start of a frame on the wire.
pub const START_DELIMITER: u8 = 0xAA;
/// Byte marking the end of a frame on the wire.
pub const END_DELIMITER: u8 = 0xBB;

/// Maximum number of payload bytes in a message.
pub const MAX_PAYLOAD_LEN: usize = 8;
/// Number of payload bytes usable for packed values when crc is enabled.
pub const MAX_CRC_PAYLOAD_LEN: usize = MAX_PAYLOAD_LEN - 2;

/// Start delimiter, timestamp, length and identifier.
pub const HEADER_LEN: usize = 10;
/// Size of the largest possible frame, including both delimiters.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN + 1;
/// Number of bytes examined after the start delimiter before a frame is given up on.
pub const READ_WINDOW_LEN: usize = MAX_FRAME_LEN - 1;

pub(crate) const CRC8: crc::Crc<u8> = crc::Crc::<u8>::new(&crc::CRC_8_SMBUS);
