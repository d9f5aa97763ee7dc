use crate::{
    crc8, Error, Fault, RawFrame, END_DELIMITER, HEADER_LEN, MAX_CRC_PAYLOAD_LEN,
    MAX_FRAME_LEN, MAX_PAYLOAD_LEN, START_DELIMITER,
};

mod pack;
pub use pack::*;

/// Selects whether the last two payload bytes carry a rolling counter and a CRC8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcMode {
    #[default]
    None,
    /// Payload byte `length - 2` holds the counter, byte `length - 1` the checksum.
    /// Only 6 bytes remain for packed values.
    Crc8,
}

/// Represents a CAN message relayed over the serial link
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    identifier: u32,
    length: u8,
    crc_mode: CrcMode,
    timestamp: u32,
    payload: [u8; MAX_PAYLOAD_LEN],
    counter: u8,
    crc: u8,
}

impl Message {
    /// Creates a new message with a zeroed payload.
    ///
    /// `length` must be at most 8, and at least 2 when crc is enabled.
    pub const fn new(identifier: u32, length: u8, crc_mode: CrcMode) -> Result<Self, Error> {
        if length as usize > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidLength { len: length });
        }
        if matches!(crc_mode, CrcMode::Crc8) && length < 2 {
            return Err(Error::LengthTooShortForCrc { len: length });
        }

        Ok(Self {
            identifier,
            length,
            crc_mode,
            timestamp: 0,
            payload: [0; MAX_PAYLOAD_LEN],
            counter: 0,
            crc: 0,
        })
    }

    /// Get the arbitration id
    pub fn identifier(&self) -> u32 {
        self.identifier
    }

    /// Get the number of valid payload bytes
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn crc_mode(&self) -> CrcMode {
        self.crc_mode
    }

    /// Get the sender's timestamp. Only meaningful after a successful receive.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Get the whole 8 byte payload, including bytes past `length`
    pub fn payload(&self) -> &[u8; MAX_PAYLOAD_LEN] {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut [u8; MAX_PAYLOAD_LEN] {
        &mut self.payload
    }

    /// Get the valid section of the payload
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.length as usize]
    }

    /// Get the rolling counter. Incremented on every send, restored from the payload on a
    /// crc-checked receive.
    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// Get the checksum computed during the last crc-checked receive
    pub fn crc(&self) -> u8 {
        self.crc
    }

    /// Number of payload bytes available to `pack_values` and `pack_text`.
    pub fn capacity(&self) -> usize {
        match self.crc_mode {
            CrcMode::None => MAX_PAYLOAD_LEN,
            CrcMode::Crc8 => MAX_CRC_PAYLOAD_LEN,
        }
    }

    /// Packs `values` little-endian into the payload, starting at offset 0.
    ///
    /// Every call starts over at offset 0, so a second call overwrites the first one
    /// rather than appending to it.
    pub fn pack_values<T: PackValue>(&mut self, values: &[T]) -> Result<(), Error> {
        self.check_capacity(values.len() * T::WIDTH)?;

        for (i, &value) in values.iter().enumerate() {
            value.pack_into(&mut self.payload, i * T::WIDTH);
        }

        Ok(())
    }

    /// Copies raw text bytes (no terminator) into the payload, starting at offset 0.
    pub fn pack_text(&mut self, text: impl AsRef<[u8]>) -> Result<(), Error> {
        let text = text.as_ref();
        self.check_capacity(text.len())?;

        for (i, &byte) in text.iter().enumerate() {
            byte.pack_into(&mut self.payload, i);
        }

        Ok(())
    }

    fn check_capacity(&self, len: usize) -> Result<(), Error> {
        let capacity = self.capacity();
        if len > capacity {
            return Err(Error::CapacityExceeded { len, capacity });
        }
        Ok(())
    }

    /// Serializes the message into `buf` and returns the frame length (`11 + length`).
    ///
    /// With crc enabled the counter and checksum are written into the payload first.
    /// The counter itself is left alone; `Transceiver::send` advances it once the
    /// frame is on the wire.
    pub fn encode_frame(&mut self, timestamp: u32, buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
        let len = self.length as usize;

        if self.crc_mode == CrcMode::Crc8 && len >= 2 {
            self.payload[len - 2] = self.counter;
            self.payload[len - 1] = crc8(&self.payload[..len - 1]);
        }

        buf[0] = START_DELIMITER;
        buf[1..5].copy_from_slice(&timestamp.to_le_bytes());
        buf[5] = self.length;
        buf[6..HEADER_LEN].copy_from_slice(&self.identifier.to_le_bytes());
        buf[HEADER_LEN..HEADER_LEN + len].copy_from_slice(&self.payload[..len]);
        buf[HEADER_LEN + len] = END_DELIMITER;

        HEADER_LEN + len + 1
    }

    pub(crate) fn advance_counter(&mut self) {
        self.counter = self.counter.wrapping_add(1);
    }

    /// Copies a received frame into the message and verifies its checksum if crc is
    /// enabled.
    ///
    /// The crc mode is the only field kept. On a checksum mismatch the received data is
    /// still loaded.
    pub fn load(&mut self, frame: &RawFrame) -> Result<(), Fault> {
        let data = frame.data();

        self.timestamp = frame.timestamp();
        self.identifier = frame.identifier();
        self.length = frame.length();
        self.payload[..data.len()].copy_from_slice(data);

        match self.crc_mode {
            CrcMode::None => Ok(()),
            CrcMode::Crc8 => self.verify_crc(),
        }
    }

    fn verify_crc(&mut self) -> Result<(), Fault> {
        let len = self.length as usize;
        let body = &self.payload[..len.saturating_sub(1)];
        let actual = crc8(body);
        self.crc = actual;

        // Too short to carry both a counter and a checksum
        if len < 2 {
            let expected = self.payload[..len].last().copied().unwrap_or(0);
            return Err(Fault::CrcMismatch { expected, actual });
        }

        self.counter = self.payload[len - 2];

        let expected = self.payload[len - 1];
        if actual != expected {
            return Err(Fault::CrcMismatch { expected, actual });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{crc8, CrcMode, Error, Fault, Message, RawFrame, MAX_FRAME_LEN};

    #[test]
    fn test_new_rejects_invalid_length() {
        assert_eq!(
            Message::new(0x10, 9, CrcMode::None),
            Err(Error::InvalidLength { len: 9 })
        );
        assert_eq!(
            Message::new(0x10, 1, CrcMode::Crc8),
            Err(Error::LengthTooShortForCrc { len: 1 })
        );
        assert!(Message::new(0x10, 0, CrcMode::None).is_ok());
        assert!(Message::new(0x10, 8, CrcMode::Crc8).is_ok());
    }

    #[test]
    fn test_pack_text() {
        let mut message = Message::new(0xFF, 6, CrcMode::Crc8).unwrap();

        message.pack_text("test").unwrap();

        assert_eq!(&message.payload()[..4], b"test");
        assert_eq!(&message.payload()[4..], &[0; 4]);
    }

    #[test]
    fn test_pack_values() {
        let mut message = Message::new(0xFF, 6, CrcMode::Crc8).unwrap();

        message.pack_values(&[0x15u16, 0xE2]).unwrap();
        assert_eq!(&message.payload()[..4], &[0x15, 0x00, 0xE2, 0x00]);

        let mut message = Message::new(0x42, 8, CrcMode::None).unwrap();
        message.pack_values(&[-1i32, 0x0A0B_0C0D]).unwrap();
        assert_eq!(
            message.payload(),
            &[0xFF, 0xFF, 0xFF, 0xFF, 0x0D, 0x0C, 0x0B, 0x0A]
        );

        message.pack_values(&[0x0102_0304_0506_0708u64]).unwrap();
        assert_eq!(message.payload(), &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_pack_restarts_at_offset_zero() {
        let mut message = Message::new(1, 8, CrcMode::None).unwrap();

        message.pack_values(&[0xAAu8, 0xBB, 0xCC]).unwrap();
        message.pack_values(&[0x11u8]).unwrap();

        assert_eq!(&message.payload()[..3], &[0x11, 0xBB, 0xCC]);
    }

    #[test]
    fn test_pack_capacity() {
        let mut with_crc = Message::new(1, 8, CrcMode::Crc8).unwrap();
        assert_eq!(
            with_crc.pack_values(&[0u16; 4]),
            Err(Error::CapacityExceeded {
                len: 8,
                capacity: 6
            })
        );
        assert_eq!(
            with_crc.pack_text("seven!!"),
            Err(Error::CapacityExceeded {
                len: 7,
                capacity: 6
            })
        );
        assert!(with_crc.pack_values(&[0u16; 3]).is_ok());

        let mut without_crc = Message::new(1, 8, CrcMode::None).unwrap();
        assert!(without_crc.pack_values(&[0u16; 4]).is_ok());
        assert!(without_crc.pack_text("12345678").is_ok());
        assert_eq!(
            without_crc.pack_values(&[0u8; 9]),
            Err(Error::CapacityExceeded {
                len: 9,
                capacity: 8
            })
        );

        // Rejected packs leave the payload alone
        assert_eq!(with_crc.payload(), &[0; 8]);
    }

    #[test]
    fn test_encode_frame() {
        let mut message = Message::new(0xFF, 6, CrcMode::None).unwrap();
        message.pack_text("test").unwrap();

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = message.encode_frame(1, &mut buf);

        #[rustfmt::skip]
        let expected = [
            // Start
            0xAA,
            // Timestamp
            0x01, 0x00, 0x00, 0x00,
            // Length
            6,
            // Identifier
            0xFF, 0x00, 0x00, 0x00,
            // Payload
            b't', b'e', b's', b't', 0x00, 0x00,
            // End
            0xBB,
        ];
        assert_eq!(&buf[..len], &expected);
    }

    #[test]
    fn test_encode_frame_with_crc() {
        let mut message = Message::new(0x1234_5678, 6, CrcMode::Crc8).unwrap();
        message.pack_values(&[1u8, 2, 3, 4]).unwrap();
        message.counter = 9;

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = message.encode_frame(0xDEAD_BEEF, &mut buf);

        assert_eq!(len, 17);
        assert_eq!(&buf[1..5], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(&buf[6..10], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(message.payload()[4], 9);
        assert_eq!(message.payload()[5], crc8(&[1, 2, 3, 4, 9]));
        assert_eq!(&buf[10..16], &message.payload()[..6]);
        // Encoding alone does not advance the counter
        assert_eq!(message.counter(), 9);
    }

    #[test]
    fn test_encode_empty_frame() {
        let mut message = Message::new(0x7FF, 0, CrcMode::None).unwrap();

        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = message.encode_frame(0, &mut buf);

        assert_eq!(len, 11);
        assert_eq!(buf[10], 0xBB);
    }

    fn frame_from(message: &mut Message, timestamp: u32) -> RawFrame {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = message.encode_frame(timestamp, &mut buf);
        RawFrame::new(&buf[..len]).unwrap()
    }

    #[test]
    fn test_load_with_crc() {
        let mut sent = Message::new(0x55, 8, CrcMode::Crc8).unwrap();
        sent.pack_text("abcdef").unwrap();
        sent.counter = 200;
        let frame = frame_from(&mut sent, 77);

        let mut received = Message::new(0, 2, CrcMode::Crc8).unwrap();
        assert_eq!(received.load(&frame), Ok(()));
        assert_eq!(received.identifier(), 0x55);
        assert_eq!(received.timestamp(), 77);
        assert_eq!(received.length(), 8);
        assert_eq!(received.counter(), 200);
        assert_eq!(received.crc(), sent.payload()[7]);
        assert_eq!(received.payload(), sent.payload());
    }

    #[test]
    fn test_load_crc_mismatch_keeps_data() {
        let mut sent = Message::new(0x55, 6, CrcMode::Crc8).unwrap();
        sent.pack_text("abcd").unwrap();
        let mut buf = [0u8; MAX_FRAME_LEN];
        let len = sent.encode_frame(0, &mut buf);
        buf[10] ^= 0x01;
        let frame = RawFrame::new(&buf[..len]).unwrap();

        let mut received = Message::new(0, 6, CrcMode::Crc8).unwrap();
        let expected = sent.payload()[5];
        let actual = crc8(&[b'a' ^ 0x01, b'b', b'c', b'd', 0]);
        assert_eq!(
            received.load(&frame),
            Err(Fault::CrcMismatch { expected, actual })
        );
        assert_eq!(received.payload()[0], b'a' ^ 0x01);
        assert_eq!(received.identifier(), 0x55);
    }

    #[test]
    fn test_load_short_frame_with_crc() {
        let mut sent = Message::new(0x55, 1, CrcMode::None).unwrap();
        let frame = frame_from(&mut sent, 0);

        let mut received = Message::new(0, 6, CrcMode::Crc8).unwrap();
        assert!(matches!(
            received.load(&frame),
            Err(Fault::CrcMismatch { .. })
        ));
        assert_eq!(received.length(), 1);
    }

    #[test]
    fn test_load_without_crc_ignores_checksum() {
        let mut sent = Message::new(0x99, 3, CrcMode::None).unwrap();
        sent.pack_values(&[7u8, 8, 9]).unwrap();
        let frame = frame_from(&mut sent, 5);

        let mut received = Message::new(0, 8, CrcMode::None).unwrap();
        assert_eq!(received.load(&frame), Ok(()));
        assert_eq!(received.data(), &[7, 8, 9]);
        assert_eq!(received.counter(), 0);
    }
}
