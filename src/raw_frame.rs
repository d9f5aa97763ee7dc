use crate::{buffer::le_u32_at, Error, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN};

/// Represents a raw frame as read off the wire (crc not yet checked)
///
/// Holds every byte from the start delimiter up to and including the end delimiter.
/// When the delimiter arrived later than `11 + length`, the stray bytes between the
/// payload and the delimiter are kept too.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    pub(crate) buf: [u8; MAX_FRAME_LEN],
    pub(crate) len: usize,
}

impl RawFrame {
    pub(crate) const fn empty() -> RawFrame {
        RawFrame {
            buf: [0u8; MAX_FRAME_LEN],
            len: 0,
        }
    }

    /// Create a new RawFrame from the given slice. The slice must be
    /// at most `MAX_FRAME_LEN` bytes long.
    pub fn new(slice: &[u8]) -> Result<RawFrame, Error> {
        let mut frame = RawFrame {
            buf: [0u8; MAX_FRAME_LEN],
            len: slice.len(),
        };

        frame
            .buf
            .get_mut(..slice.len())
            .ok_or(Error::FrameTooLong { len: slice.len() })?
            .copy_from_slice(slice);

        Ok(frame)
    }

    /// Get the slice of the raw frame buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len.min(MAX_FRAME_LEN)]
    }

    pub fn timestamp(&self) -> u32 {
        le_u32_at(&self.buf, 1)
    }

    /// Get the payload length, clamped to 8
    pub fn length(&self) -> u8 {
        self.buf[5].min(MAX_PAYLOAD_LEN as u8)
    }

    pub fn identifier(&self) -> u32 {
        le_u32_at(&self.buf, 6)
    }

    /// Get the payload section of the raw frame
    pub fn data(&self) -> &[u8] {
        &self.buf[HEADER_LEN..HEADER_LEN + self.length() as usize]
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, RawFrame, MAX_FRAME_LEN};

    #[test]
    fn test_raw_frame_fields() {
        #[rustfmt::skip]
        let raw = RawFrame::new(&[
            0xAA,
            0x04, 0x03, 0x02, 0x01,
            3,
            0xFF, 0x07, 0x00, 0x00,
            0x10, 0x20, 0x30,
            0xBB,
        ])
        .unwrap();

        assert_eq!(raw.timestamp(), 0x0102_0304);
        assert_eq!(raw.length(), 3);
        assert_eq!(raw.identifier(), 0x7FF);
        assert_eq!(raw.data(), &[0x10, 0x20, 0x30]);
        assert_eq!(raw.as_slice().len(), 14);
    }

    #[test]
    fn test_raw_frame_clamps_length() {
        let mut bytes = [0u8; MAX_FRAME_LEN];
        bytes[5] = 0xF0;

        let raw = RawFrame::new(&bytes).unwrap();
        assert_eq!(raw.length(), 8);
        assert_eq!(raw.data().len(), 8);
    }

    #[test]
    fn test_raw_frame_too_long() {
        assert_eq!(
            RawFrame::new(&[0; MAX_FRAME_LEN + 1]),
            Err(Error::FrameTooLong {
                len: MAX_FRAME_LEN + 1
            })
        );
    }
}
