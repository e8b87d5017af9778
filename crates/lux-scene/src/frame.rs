//! DMX frame compilation.
//!
//! A frame is compiled in two steps. [`compute_frame`] walks the styled
//! tree and produces a sorted list of `(address, value)` pairs, one per
//! channel written this tick. [`DmxFrame::from_channels`] then lays the list
//! out as the 512-byte buffer transports send.

use lux_ir::diagnostics::diagnostics_enabled;
use lux_ir::{Channel, DeviceMap, DeviceMapping, EnumChannel, StyleValue, TreeNode, device_for};

use crate::animation::KeyframeMap;
use crate::error::FrameError;
use crate::style::compute_style;

/// Channels in one DMX universe.
pub const UNIVERSE_SIZE: usize = 512;

/// One universe of channel values. Address `n` is stored at byte `n - 1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DmxFrame([u8; UNIVERSE_SIZE]);

impl Default for DmxFrame {
    fn default() -> Self {
        Self([0; UNIVERSE_SIZE])
    }
}

impl std::fmt::Debug for DmxFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.channels()).finish()
    }
}

impl DmxFrame {
    /// Materialize a channel list. Unlisted addresses stay at zero; when an
    /// address is listed twice the last value wins.
    pub fn from_channels(channels: &[(u16, u8)]) -> Self {
        let mut frame = Self::default();
        for &(address, value) in channels {
            frame.set(address, value);
        }
        frame
    }

    pub fn as_bytes(&self) -> &[u8; UNIVERSE_SIZE] {
        &self.0
    }

    /// Value at a 1-based address; `None` outside the universe.
    pub fn get(&self, address: u16) -> Option<u8> {
        let index = usize::from(address).checked_sub(1)?;
        self.0.get(index).copied()
    }

    fn set(&mut self, address: u16, value: u8) {
        if let Some(slot) = usize::from(address)
            .checked_sub(1)
            .and_then(|index| self.0.get_mut(index))
        {
            *slot = value;
        }
    }

    /// Non-zero channels as `(address, value)`.
    pub fn channels(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        (1u16..)
            .zip(self.0.iter().copied())
            .filter(|&(_, value)| value != 0)
    }

    /// Channels whose value differs from `previous`.
    pub fn changes<'a>(&'a self, previous: &'a DmxFrame) -> impl Iterator<Item = (u16, u8)> + 'a {
        (1u16..)
            .zip(self.0.iter().zip(previous.0.iter()))
            .filter(|(_, (now, before))| now != before)
            .map(|(address, (now, _))| (address, *now))
    }
}

/// Compile the channel list of every device placed in `tree` at time `t`.
///
/// Nodes whose tag (or id) names no device are skipped. The result is
/// sorted by address; the order of writes to the same address is kept.
pub fn compute_frame(
    tree: &TreeNode,
    devices: &DeviceMap,
    keyframes: &KeyframeMap,
    t: f64,
) -> Result<Vec<(u16, u8)>, FrameError> {
    let mut out = Vec::new();
    for node in tree.walk() {
        let Some(mapping) = device_for(devices, node) else {
            continue;
        };
        let style = compute_style(node, keyframes, t)?;
        let mut relative = Vec::new();
        for value in style.values() {
            encode(value, mapping, &mut relative);
        }
        for (chan, value) in relative {
            let address = u32::from(node.offset) + u32::from(chan);
            if !(1..=UNIVERSE_SIZE as u32).contains(&address) {
                return Err(FrameError::AddressOutOfRange {
                    node: node.label(),
                    address,
                });
            }
            out.push((address as u16, value));
        }
    }
    out.sort_by_key(|&(address, _)| address);

    if diagnostics_enabled("frame") {
        tracing::debug!(t, channels = out.len(), frame = ?out, "compiled frame");
    }
    Ok(out)
}

/// Channels `value` writes on a device described by `mapping`, relative to
/// the device's placement. Properties the device lacks write nothing.
pub fn encode(value: &StyleValue, mapping: &DeviceMapping, out: &mut Vec<(u16, u8)>) {
    match value {
        StyleValue::Color(color) => {
            let Some(channels) = &mapping.color else {
                return;
            };
            numeric(&channels.red, color.red, out);
            numeric(&channels.green, color.green, out);
            numeric(&channels.blue, color.blue, out);
            if let Some(white) = &channels.white {
                numeric(white, color.white, out);
            }
            if let Some(alpha) = &channels.alpha {
                numeric(alpha, color.alpha, out);
            }
            if let (Some(name), Some(wheel)) = (&color.name, &channels.name) {
                enumerated(wheel, name, out);
            }
        }
        StyleValue::Strobe(strobe) => {
            if let Some(channels) = &mapping.strobe {
                numeric(&channels.speed, strobe.speed, out);
            }
        }
        StyleValue::Pulse(pulse) => {
            if let Some(channels) = &mapping.pulse {
                numeric(&channels.speed, pulse.speed, out);
                enumerated(&channels.direction, pulse.direction.name(), out);
            }
        }
        StyleValue::Auto(auto) => {
            if let Some(channels) = &mapping.auto {
                enumerated(&channels.value, &auto.name, out);
                if let Some(speed) = &channels.speed {
                    numeric(speed, auto.speed, out);
                }
            }
        }
        StyleValue::Rotation(rotation) => {
            if let Some(channels) = &mapping.rotation {
                if let Some(position) = &channels.position {
                    numeric(position, rotation.position, out);
                }
                if let Some(speed) = &channels.speed {
                    numeric(speed, rotation.speed, out);
                }
            }
        }
    }
}

fn numeric(channel: &Channel, value: u8, out: &mut Vec<(u16, u8)>) {
    out.push((channel.chan, channel.scale(value)));
    out.extend(channel.cond.iter().map(|cond| (cond.chan, cond.range[0])));
}

fn enumerated(channel: &EnumChannel, name: &str, out: &mut Vec<(u16, u8)>) {
    match channel.lookup(name) {
        Some(value) => out.push((channel.chan, value)),
        None => tracing::trace!(chan = channel.chan, name, "no enum range for value"),
    }
}
