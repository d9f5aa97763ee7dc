use crate::{Error, Fault, FaultReason, FrameReader, Message, ReaderConfig, MAX_FRAME_LEN};

/// Byte transport the transceiver reads from and writes to, typically a UART.
pub trait Transport {
    /// Settings applied by `begin`, e.g. a baud rate.
    type Config;

    fn begin(&mut self, config: Self::Config);

    /// Returns `true` if `read_byte` has a byte to hand out.
    fn byte_available(&mut self) -> bool;

    /// Only called after `byte_available` returned `true`.
    fn read_byte(&mut self) -> u8;

    fn write_byte(&mut self, byte: u8);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Config = T::Config;

    fn begin(&mut self, config: Self::Config) {
        (**self).begin(config)
    }

    fn byte_available(&mut self) -> bool {
        (**self).byte_available()
    }

    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte)
    }
}

/// Monotonic millisecond clock used to time out a stalled receive.
///
/// Only differences between readings are used, so wrapping around is fine.
pub trait Clock {
    fn millis(&self) -> u32;
}

impl<F: Fn() -> u32> Clock for F {
    fn millis(&self) -> u32 {
        self()
    }
}

/// Sends and receives messages over a byte transport
///
/// Blocking and single-threaded: `receive` can hold the caller for up to the timeout
/// for each of the 18 bytes following the start delimiter.
pub struct Transceiver<T, C> {
    transport: T,
    clock: C,
    begun: bool,
    fault_reason: FaultReason,
    buf: [u8; MAX_FRAME_LEN],
    reader: FrameReader,
}

impl<T: Transport, C: Clock> Transceiver<T, C> {
    /// Creates a new Transceiver. `begin` must be called before sending or receiving.
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            begun: false,
            fault_reason: FaultReason::None,
            buf: [0; MAX_FRAME_LEN],
            reader: FrameReader::new(ReaderConfig::default()),
        }
    }

    /// Initializes the transport and marks the transceiver ready.
    pub fn begin(&mut self, config: T::Config) {
        self.transport.begin(config);
        self.begun = true;
    }

    /// Get the outcome of the most recent receive
    pub fn fault_reason(&self) -> FaultReason {
        self.fault_reason
    }

    /// Gives the transport and clock back.
    pub fn release(self) -> (T, C) {
        (self.transport, self.clock)
    }

    fn ensure_begun(&self) -> Result<(), Error> {
        if !self.begun {
            return Err(Error::NotInitialized);
        }
        Ok(())
    }

    /// Writes `message` to the transport as a single frame stamped with `timestamp`.
    ///
    /// With crc enabled the counter and checksum are stored in the message payload
    /// before it is written. The message counter is advanced after every send.
    pub fn send(&mut self, message: &mut Message, timestamp: u32) -> Result<(), Error> {
        self.ensure_begun()?;

        let len = message.encode_frame(timestamp, &mut self.buf);
        for &byte in &self.buf[..len] {
            self.transport.write_byte(byte);
        }
        message.advance_counter();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Sent frame: id={=u32:#x}, len={=u8}, counter={=u8}",
            message.identifier(),
            message.length(),
            message.counter()
        );

        Ok(())
    }

    /// Receives a frame into `message`.
    ///
    /// Returns `Ok(true)` on success. On `Ok(false)` the cause is available from
    /// `fault_reason`. Does not wait for the first byte: if nothing is pending the call
    /// fails with `FaultReason::NoIncomingData` right away. Every following byte gets
    /// its own `timeout_ms` budget.
    ///
    /// On a timeout or a missing end delimiter `message` is left untouched. On a crc
    /// mismatch it holds the received data.
    pub fn receive(&mut self, message: &mut Message, timeout_ms: u32) -> Result<bool, Error> {
        self.ensure_begun()?;

        self.reader.reset();
        let outcome = self.read_frame(message, timeout_ms);
        if outcome.is_err() {
            self.reader.reset();
        }

        self.fault_reason = match outcome {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Received frame: id={=u32:#x}, len={=u8}",
                    message.identifier(),
                    message.length()
                );
                FaultReason::None
            }
            Err(fault) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Receive failed: {}", fault);
                fault.into()
            }
        };

        Ok(outcome.is_ok())
    }

    fn read_frame(&mut self, message: &mut Message, timeout_ms: u32) -> Result<(), Fault> {
        if !self.transport.byte_available() {
            return Err(Fault::NoIncomingData);
        }

        let byte = self.transport.read_byte();
        if let Some(Err(fault)) = self.reader.push_byte(byte) {
            return Err(fault);
        }

        // The reader gives up after a fixed window, so this terminates
        loop {
            self.wait_for_byte(timeout_ms)?;

            let byte = self.transport.read_byte();
            match self.reader.push_byte(byte) {
                Some(Ok(frame)) => return message.load(frame),
                Some(Err(fault)) => return Err(fault),
                None => {}
            }
        }
    }

    fn wait_for_byte(&mut self, timeout_ms: u32) -> Result<(), Fault> {
        let started = self.clock.millis();
        while !self.transport.byte_available() {
            if self.clock.millis().wrapping_sub(started) > timeout_ms {
                return Err(Fault::Timeout);
            }
        }
        Ok(())
    }
}
