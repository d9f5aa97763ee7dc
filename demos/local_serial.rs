use std::{
    env,
    io::{self, Read, Write},
    time::{Duration, Instant},
};

use serial_can::{CrcMode, FaultReason, Message, Transceiver, Transport};
use serialport::SerialPort;

/// Serial port exposed through the byte-level transport interface
struct SerialTransport {
    port: Box<dyn SerialPort>,
    peeked: Option<u8>,
}

impl Transport for SerialTransport {
    type Config = u32;

    fn begin(&mut self, baud_rate: u32) {
        if let Err(e) = self.port.set_baud_rate(baud_rate) {
            eprintln!("{e}");
        }
    }

    fn byte_available(&mut self) -> bool {
        if self.peeked.is_some() {
            return true;
        }

        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => {
                self.peeked = Some(buf[0]);
                true
            }
            Ok(_) => false,
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => false,
            Err(e) => {
                eprintln!("{e}");
                false
            }
        }
    }

    fn read_byte(&mut self) -> u8 {
        self.peeked.take().unwrap_or(0)
    }

    fn write_byte(&mut self, byte: u8) {
        if let Err(e) = self.port.write_all(&[byte]) {
            eprintln!("{e}");
        }
    }
}

const HEARTBEAT_ID: u32 = 0x100;
/// Payload byte of a heartbeat carrying the sender's last fault code
const FAULT_BYTE: usize = 4;

fn main() {
    let path = env::args().nth(1).expect("no serial port supplied");
    let baud_rate = env::args()
        .nth(2)
        .map(|arg| arg.parse().expect("invalid baud rate"))
        .unwrap_or(115_200);

    let port = serialport::new(path, baud_rate)
        .timeout(Duration::from_millis(1))
        .open()
        .expect("failed to open serial port");

    let start = Instant::now();
    let clock = move || start.elapsed().as_millis() as u32;

    let mut transceiver = Transceiver::new(SerialTransport { port, peeked: None }, clock);
    transceiver.begin(baud_rate);

    let mut heartbeat = Message::new(HEARTBEAT_ID, 8, CrcMode::Crc8).expect("valid message");
    let mut incoming = Message::new(0, 8, CrcMode::None).expect("valid message");
    let mut last_heartbeat = 0;

    loop {
        let now = clock();
        if now.wrapping_sub(last_heartbeat) >= 1000 {
            heartbeat.pack_values(&[now]).expect("fits in payload");
            heartbeat.payload_mut()[FAULT_BYTE] = transceiver.fault_reason() as u8;
            transceiver.send(&mut heartbeat, now).expect("transceiver initialized");
            last_heartbeat = now;
        }

        match transceiver.receive(&mut incoming, 20) {
            Ok(true) if incoming.identifier() == HEARTBEAT_ID => {
                match incoming.data().get(FAULT_BYTE).copied().map(FaultReason::try_from) {
                    Some(Ok(FaultReason::None)) => (),
                    Some(Ok(reason)) => println!("peer reports {reason:?}"),
                    Some(Err(e)) => eprintln!("peer sent an unknown fault code: {e}"),
                    None => eprintln!("heartbeat too short"),
                }
            }
            Ok(true) => println!(
                "{:>10} id={:#x} data={:02x?}",
                incoming.timestamp(),
                incoming.identifier(),
                incoming.data()
            ),
            Ok(false) => match transceiver.fault_reason() {
                FaultReason::NoIncomingData => (),
                reason => eprintln!("receive failed: {reason:?}"),
            },
            Err(e) => {
                eprintln!("{e}");
                break;
            }
        }
    }
}
