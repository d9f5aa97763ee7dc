use crate::CRC8;

/// Computes the CRC8 checksum used by the framing protocol.
///
/// The remainder starts at zero and each byte is folded in through a 256-entry lookup
/// table generated from the polynomial `0x07` (`CRC-8/SMBUS`: no reflection, no final
/// xor). Peers must use the same table to stay wire compatible.
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}
