//! Transports that come and go: lazy connection with bounded backoff.

use std::io;
use std::time::{Duration, Instant};

use lux_scene::{DmxFrame, FrameSink, SinkError};

/// Opens a fresh connection to a transport.
pub trait Connector {
    type Sink: FrameSink;

    /// Human readable destination, used as the sink name.
    fn describe(&self) -> String;

    fn connect(&mut self) -> io::Result<Self::Sink>;
}

/// Exponential backoff between `initial` and `max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt; each call doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(30))
    }
}

/// A [`FrameSink`] that opens its transport on first use and reopens it
/// after a failure.
///
/// While the transport is down, sends fail fast with
/// [`SinkError::Unavailable`] until the backoff delay has passed. A
/// successful send resets the backoff.
pub struct Reconnecting<C: Connector> {
    connector: C,
    name: String,
    sink: Option<C::Sink>,
    backoff: Backoff,
    retry_at: Option<Instant>,
}

impl<C: Connector> Reconnecting<C> {
    pub fn new(connector: C, backoff: Backoff) -> Self {
        Self {
            name: connector.describe(),
            connector,
            sink: None,
            backoff,
            retry_at: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    fn schedule_retry(&mut self) -> Duration {
        let delay = self.backoff.next_delay();
        self.retry_at = Some(Instant::now() + delay);
        delay
    }

    fn unavailable(&self, retry_in: Duration) -> SinkError {
        SinkError::Unavailable {
            name: self.name.clone(),
            retry_in,
        }
    }

    fn ensure_connected(&mut self) -> Result<&mut C::Sink, SinkError> {
        if self.sink.is_none() {
            if let Some(retry_in) = self
                .retry_at
                .and_then(|at| at.checked_duration_since(Instant::now()))
                .filter(|wait| !wait.is_zero())
            {
                return Err(self.unavailable(retry_in));
            }
            match self.connector.connect() {
                Ok(sink) => {
                    tracing::info!(sink = %self.name, "connected");
                    self.sink = Some(sink);
                    self.retry_at = None;
                }
                Err(err) => {
                    let retry_in = self.schedule_retry();
                    tracing::warn!(
                        sink = %self.name,
                        error = %err,
                        retry_ms = retry_in.as_millis() as u64,
                        "connection failed"
                    );
                    return Err(self.unavailable(retry_in));
                }
            }
        }
        self.sink
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected).into())
    }
}

impl<C: Connector> FrameSink for Reconnecting<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        let result = self.ensure_connected()?.send(frame);
        match result {
            Ok(()) => {
                self.backoff.reset();
                Ok(())
            }
            Err(err) => {
                self.sink = None;
                let retry_in = self.schedule_retry();
                tracing::warn!(
                    sink = %self.name,
                    error = %err,
                    retry_ms = retry_in.as_millis() as u64,
                    "send failed, dropping connection"
                );
                Err(err)
            }
        }
    }
}
