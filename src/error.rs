use crate::{MAX_FRAME_LEN, MAX_PAYLOAD_LEN, READ_WINDOW_LEN};
use num_enum::TryFromPrimitive;
use snafu::Snafu;

/// Enum of configuration errors.
///
/// These are caller mistakes: the call is rejected and nothing is written.
#[non_exhaustive]
#[derive(Debug, PartialEq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[snafu(display("Invalid length {len}, should be at most {MAX_PAYLOAD_LEN}"))]
    InvalidLength { len: u8 },
    #[snafu(display("Length {len} cannot hold the counter and crc bytes"))]
    LengthTooShortForCrc { len: u8 },
    #[snafu(display("Packing {len} bytes exceeds the payload capacity of {capacity} bytes"))]
    CapacityExceeded { len: usize, capacity: usize },
    #[snafu(display("Frame of {len} bytes is longer than {MAX_FRAME_LEN} bytes"))]
    FrameTooLong { len: usize },
    #[snafu(display("Transceiver used before begin"))]
    NotInitialized,
}

/// Enum of runtime faults raised while receiving a frame.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Snafu)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    #[snafu(display("No incoming frame"))]
    NoIncomingData,
    #[snafu(display("Timed out waiting for the next byte"))]
    Timeout,
    #[snafu(display("No end delimiter within {READ_WINDOW_LEN} bytes of the start delimiter"))]
    MissingEndDelimiter,
    #[snafu(display("Crc checksum mismatch: expected {expected:#04x}, got {actual:#04x}"))]
    CrcMismatch { expected: u8, actual: u8 },
}

/// Outcome of the most recent receive, as reported by `Transceiver::fault_reason`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FaultReason {
    None = 0,
    Timeout = 1,
    NoIncomingData = 2,
    CrcMismatch = 3,
    MissingEndDelimiter = 4,
}

impl From<Fault> for FaultReason {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::NoIncomingData => FaultReason::NoIncomingData,
            Fault::Timeout => FaultReason::Timeout,
            Fault::MissingEndDelimiter => FaultReason::MissingEndDelimiter,
            Fault::CrcMismatch { .. } => FaultReason::CrcMismatch,
        }
    }
}
