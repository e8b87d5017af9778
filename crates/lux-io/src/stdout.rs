//! Console output of frame changes.

use std::fmt::Write as _;
use std::io::{self, Stdout, Write};

use lux_scene::{DmxFrame, FrameSink, SinkError};

/// Prints the channels that changed since the previous frame, one line per
/// frame: `frame <n>: 1=255 4=0 ...`.
pub struct StdoutSink<W: Write = Stdout> {
    out: W,
    previous: DmxFrame,
    frames: u64,
}

impl StdoutSink<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for StdoutSink<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            previous: DmxFrame::default(),
            frames: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for StdoutSink<W> {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        let mut line = format!("frame {}:", self.frames);
        for (address, value) in frame.changes(&self.previous) {
            let _ = write!(line, " {address}={value}");
        }
        writeln!(self.out, "{line}")?;
        self.previous = *frame;
        self.frames += 1;
        Ok(())
    }
}
