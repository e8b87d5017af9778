//! Serial DMX widgets.
//!
//! The widget expects the start code `0x00` followed by the 512 channel
//! bytes. The packet is written in small chunks with a short pause between
//! them so the device's receive buffer never overflows.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use lux_scene::{DmxFrame, FrameSink, SinkError, UNIVERSE_SIZE};

use crate::reconnect::Connector;

/// DMX start code for dimmer data.
pub const START_CODE: u8 = 0x00;
pub const DEFAULT_CHUNK_SIZE: usize = 16;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_micros(100);

/// Writes frames to a serial device, or any [`Write`].
#[derive(Debug)]
pub struct SerialSink<W: Write> {
    writer: W,
    name: String,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl SerialSink<File> {
    /// Open a serial device for writing. The line settings are left as the
    /// system configured them.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().write(true).open(path)?;
        tracing::info!(path = %path.display(), "serial output ready");
        Ok(Self::new(file, format!("serial:{}", path.display())))
    }
}

impl<W: Write> SerialSink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    /// A zero chunk size writes the packet in one go.
    pub fn with_pacing(mut self, chunk_size: usize, chunk_delay: Duration) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_delay = chunk_delay;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Start code followed by the channel data.
pub fn serial_packet(frame: &DmxFrame) -> [u8; UNIVERSE_SIZE + 1] {
    let mut packet = [0u8; UNIVERSE_SIZE + 1];
    packet[0] = START_CODE;
    packet[1..].copy_from_slice(frame.as_bytes());
    packet
}

impl<W: Write> FrameSink for SerialSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        let packet = serial_packet(frame);
        let chunk_size = if self.chunk_size == 0 {
            packet.len()
        } else {
            self.chunk_size
        };
        let mut chunks = packet.chunks(chunk_size).peekable();
        while let Some(chunk) = chunks.next() {
            self.writer.write_all(chunk)?;
            if chunks.peek().is_some() && !self.chunk_delay.is_zero() {
                std::thread::sleep(self.chunk_delay);
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Opens [`SerialSink`]s for [`Reconnecting`](crate::Reconnecting).
#[derive(Debug, Clone)]
pub struct SerialConnector {
    pub path: PathBuf,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
}

impl SerialConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }
}

impl Connector for SerialConnector {
    type Sink = SerialSink<File>;

    fn describe(&self) -> String {
        format!("serial:{}", self.path.display())
    }

    fn connect(&mut self) -> io::Result<SerialSink<File>> {
        Ok(SerialSink::open(&self.path)?.with_pacing(self.chunk_size, self.chunk_delay))
    }
}
