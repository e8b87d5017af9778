//! Art-Net output.
//!
//! Each frame goes out as one ArtDmx packet over UDP:
//!
//! | bytes   | field                                   |
//! |---------|-----------------------------------------|
//! | 0..8    | `"Art-Net\0"`                           |
//! | 8..10   | opcode `0x5000`, little endian          |
//! | 10..12  | protocol version 14, big endian         |
//! | 12      | sequence, 1..=255 (0 disables ordering) |
//! | 13      | physical port, always 0                 |
//! | 14      | SubUni: low byte of the universe        |
//! | 15      | Net: bits 8..14 of the universe         |
//! | 16..18  | data length, big endian                 |
//! | 18..    | channel data                            |

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use lux_scene::{DmxFrame, FrameSink, SinkError, UNIVERSE_SIZE};

use crate::reconnect::Connector;

pub const ARTNET_PORT: u16 = 6454;
const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
const OP_DMX: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;
/// Header bytes before the channel data.
pub const ARTDMX_HEADER_LEN: usize = 18;

/// Encode one ArtDmx packet.
pub fn artdmx_packet(universe: u16, sequence: u8, data: &[u8; UNIVERSE_SIZE]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(ARTDMX_HEADER_LEN + UNIVERSE_SIZE);
    packet.extend_from_slice(ARTNET_ID);
    packet.extend_from_slice(&OP_DMX.to_le_bytes());
    packet.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet.push(sequence);
    packet.push(0);
    packet.push((universe & 0xff) as u8);
    packet.push(((universe >> 8) & 0x7f) as u8);
    packet.extend_from_slice(&(UNIVERSE_SIZE as u16).to_be_bytes());
    packet.extend_from_slice(data);
    packet
}

/// Sends frames to an Art-Net node or broadcast address.
#[derive(Debug)]
pub struct ArtNetSink {
    socket: UdpSocket,
    target: SocketAddr,
    universe: u16,
    sequence: u8,
    name: String,
}

impl ArtNetSink {
    /// Bind an ephemeral UDP socket and resolve `target`. A target without
    /// a port uses the Art-Net port.
    pub fn connect(target: &str, universe: u16) -> io::Result<Self> {
        let target = if target.contains(':') {
            target.to_string()
        } else {
            format!("{target}:{ARTNET_PORT}")
        };
        let resolved = target.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{target}' does not resolve to an address"),
            )
        })?;
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.set_broadcast(true)?;
        tracing::info!(target = %resolved, universe, "Art-Net output ready");
        Ok(Self {
            socket,
            target: resolved,
            universe,
            sequence: 0,
            name: format!("artnet:{resolved}/{universe}"),
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn next_sequence(&mut self) -> u8 {
        self.sequence = if self.sequence == u8::MAX { 1 } else { self.sequence + 1 };
        self.sequence
    }
}

impl FrameSink for ArtNetSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        let sequence = self.next_sequence();
        let packet = artdmx_packet(self.universe, sequence, frame.as_bytes());
        self.socket.send_to(&packet, self.target)?;
        Ok(())
    }
}

/// Opens [`ArtNetSink`]s for [`Reconnecting`](crate::Reconnecting).
#[derive(Debug, Clone)]
pub struct ArtNetConnector {
    pub target: String,
    pub universe: u16,
}

impl Connector for ArtNetConnector {
    type Sink = ArtNetSink;

    fn describe(&self) -> String {
        format!("artnet:{}/{}", self.target, self.universe)
    }

    fn connect(&mut self) -> io::Result<ArtNetSink> {
        ArtNetSink::connect(&self.target, self.universe)
    }
}
