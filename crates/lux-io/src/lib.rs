//! Output transports for lux frames.
//!
//! Every transport implements [`lux_scene::FrameSink`]. Transports that can
//! drop out at runtime (network nodes, USB widgets) are wrapped in
//! [`Reconnecting`], which reopens them with bounded backoff instead of
//! stalling the show loop.

pub mod artnet;
pub mod reconnect;
pub mod serial;
pub mod stdout;

pub use artnet::{ArtNetConnector, ArtNetSink, artdmx_packet};
pub use reconnect::{Backoff, Connector, Reconnecting};
pub use serial::{SerialConnector, SerialSink, serial_packet};
pub use stdout::StdoutSink;
