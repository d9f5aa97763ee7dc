use crate::{
    buffer::BytesReader, Fault, RawFrame, END_DELIMITER, HEADER_LEN, MAX_FRAME_LEN,
    START_DELIMITER,
};

/// Represents a state machine for reading a frame
///
/// +------------+   +-----------------+
/// | AwaitStart |-->| ReadFixedWindow |
/// +------------+   +-----------------+
///       ^                   |
///       |                   |
///       +-------------------+
///
/// Once the start delimiter is seen, at most `READ_WINDOW_LEN` more bytes are taken
/// while looking for the end delimiter.
enum ReadState {
    AwaitStart,
    ReadFixedWindow,
}

/// Struct for configuring a `FrameReader`.
#[non_exhaustive]
#[derive(Clone, Copy, Debug)]
pub struct ReaderConfig {
    /// Byte opening a frame. Default is `0xAA`.
    pub start: u8,
    /// Byte closing a frame. Default is `0xBB`.
    pub end: u8,
}

impl ReaderConfig {
    pub const fn default() -> Self {
        Self {
            start: START_DELIMITER,
            end: END_DELIMITER,
        }
    }
}

/// Non-blocking frame reader, fed one or more bytes at a time
///
/// Suits interrupt or event driven transports. Timeouts are the caller's business: call
/// `reset` when the link has been silent for too long in the middle of a frame.
pub struct FrameReader {
    state: ReadState,
    raw: RawFrame,
    config: ReaderConfig,
}

impl FrameReader {
    /// Creates a new FrameReader struct
    pub const fn new(config: ReaderConfig) -> Self {
        Self {
            state: ReadState::AwaitStart,
            raw: RawFrame::empty(),
            config,
        }
    }

    /// Resets reader's state
    pub fn reset(&mut self) {
        self.state = ReadState::AwaitStart;
        self.raw.len = 0;
    }

    /// Returns `true` while a frame has been started but not finished
    pub fn in_frame(&self) -> bool {
        matches!(self.state, ReadState::ReadFixedWindow)
    }

    /// Consumes a byte and returns a raw frame once the end delimiter has been read.
    ///
    /// A byte other than the start delimiter while waiting for a frame yields
    /// `Fault::NoIncomingData` and is dropped.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<&RawFrame, Fault>> {
        self.step(byte).map(|res| res.map(|()| &self.raw))
    }

    /// Reads the first frame from the buffer, returning it along with the unconsumed bytes.
    ///
    /// Bytes preceding a start delimiter are skipped. If the buffer ends without any frame
    /// having been started, `Fault::NoIncomingData` is returned.
    pub fn push_bytes<'r, 'b>(
        &'r mut self,
        bytes: &'b [u8],
    ) -> (Option<Result<&'r RawFrame, Fault>>, &'b [u8]) {
        let mut reader = BytesReader::new(bytes);
        let mut skipped = false;

        let result = loop {
            let Some(byte) = reader.next() else {
                if skipped && !self.in_frame() {
                    break Some(Err(Fault::NoIncomingData));
                }
                break None;
            };

            match self.step(byte) {
                Some(Err(Fault::NoIncomingData)) => skipped = true,
                Some(res) => break Some(res),
                None => {}
            }
        };

        (
            result.map(|res| res.map(|()| &self.raw)),
            reader.remaining(),
        )
    }

    fn step(&mut self, byte: u8) -> Option<Result<(), Fault>> {
        match self.state {
            ReadState::AwaitStart => {
                if byte != self.config.start {
                    return Some(Err(Fault::NoIncomingData));
                }

                self.raw.buf[0] = byte;
                self.raw.len = 1;
                self.state = ReadState::ReadFixedWindow;
                None
            }
            ReadState::ReadFixedWindow => {
                let index = self.raw.len;
                self.raw.buf[index] = byte;
                self.raw.len += 1;

                // The delimiter only counts once the header and payload are complete
                let payload_end = HEADER_LEN + self.raw.length() as usize;
                if index >= payload_end && byte == self.config.end {
                    self.state = ReadState::AwaitStart;
                    return Some(Ok(()));
                }

                if self.raw.len == MAX_FRAME_LEN {
                    self.reset();
                    return Some(Err(Fault::MissingEndDelimiter));
                }

                None
            }
        }
    }

    /// Returns an iterator over the given buffer. If the buffer contains frames of a valid
    /// format, the iterator will return `Ok(RawFrame)`, otherwise `Err(Fault)`.
    /// Once the iterator yields `None`, all bytes in the buffer have been consumed.
    pub fn iter_frames<'a, 'b>(&'a mut self, buf: &'b [u8]) -> IterFrames<'a, 'b> {
        IterFrames { reader: self, buf }
    }
}

/// An iterator over a buffer that yields `RawFrame` instances, or `Fault` in case of
/// corrupt data. Created by `FrameReader::iter_frames`.
pub struct IterFrames<'a, 'b> {
    reader: &'a mut FrameReader,
    buf: &'b [u8],
}

impl Iterator for IterFrames<'_, '_> {
    type Item = Result<RawFrame, Fault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        let result;
        (result, self.buf) = self.reader.push_bytes(self.buf);
        result.map(|res| res.copied())
    }
}
