//! Device descriptions: how a fixture's properties map onto DMX channels.

mod schema;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::css::Property;
use crate::error::LoadError;
use crate::tree::TreeNode;

pub use schema::validate_device_value;

/// A channel that must hold a fixed value while its owner is driven,
/// e.g. a mode select channel. The low end of `range` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub chan: u16,
    pub range: [u8; 2],
}

/// A numeric channel. Without a `range` the value is written as is,
/// otherwise it is scaled linearly into `[lo, hi]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub chan: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<[u8; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cond: Vec<Condition>,
}

impl Channel {
    pub fn new(chan: u16) -> Self {
        Self {
            chan,
            range: None,
            cond: Vec::new(),
        }
    }

    pub fn with_range(mut self, lo: u8, hi: u8) -> Self {
        self.range = Some([lo, hi]);
        self
    }

    /// `lo + (hi - lo) * value / 255`, truncated.
    pub fn scale(&self, value: u8) -> u8 {
        match self.range {
            None => value,
            Some([lo, hi]) => {
                let lo = f64::from(lo);
                let hi = f64::from(hi);
                (lo + (hi - lo) * f64::from(value) / 255.0) as u8
            }
        }
    }
}

/// A channel selecting among named ranges (programs, wheel slots, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumChannel {
    pub chan: u16,
    #[serde(rename = "enum")]
    pub values: BTreeMap<String, [u8; 2]>,
}

impl EnumChannel {
    /// Low end of the range registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<u8> {
        self.values.get(name).map(|[lo, _]| *lo)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorChannels {
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Channel>,
    /// Color wheel, addressed by named colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<EnumChannel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrobeChannels {
    pub speed: Channel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseChannels {
    pub speed: Channel,
    pub direction: EnumChannel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoChannels {
    pub value: EnumChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Channel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationChannels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Channel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Channel>,
}

/// Per-property channel groups of one device. Every group is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorChannels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strobe: Option<StrobeChannels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<PulseChannels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<AutoChannels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationChannels>,
}

impl DeviceMapping {
    pub fn supports(&self, property: Property) -> bool {
        match property {
            Property::Color => self.color.is_some(),
            Property::Strobe => self.strobe.is_some(),
            Property::Pulse => self.pulse.is_some(),
            Property::Auto => self.auto.is_some(),
            Property::Rotation => self.rotation.is_some(),
        }
    }

    /// Every channel this device may write, relative to its placement.
    pub fn channels(&self) -> BTreeSet<u16> {
        let mut out = BTreeSet::new();
        let mut numeric = |c: &Channel| {
            out.insert(c.chan);
            out.extend(c.cond.iter().map(|cond| cond.chan));
        };
        if let Some(color) = &self.color {
            for channel in [&color.red, &color.green, &color.blue] {
                numeric(channel);
            }
            color.white.iter().chain(color.alpha.iter()).for_each(&mut numeric);
        }
        if let Some(strobe) = &self.strobe {
            numeric(&strobe.speed);
        }
        if let Some(pulse) = &self.pulse {
            numeric(&pulse.speed);
        }
        if let Some(auto) = &self.auto {
            auto.speed.iter().for_each(&mut numeric);
        }
        if let Some(rotation) = &self.rotation {
            rotation
                .position
                .iter()
                .chain(rotation.speed.iter())
                .for_each(&mut numeric);
        }
        let enums = [
            self.color.as_ref().and_then(|c| c.name.as_ref()),
            self.pulse.as_ref().map(|p| &p.direction),
            self.auto.as_ref().map(|a| &a.value),
        ];
        out.extend(enums.into_iter().flatten().map(|e| e.chan));
        out
    }
}

/// On-disk form of a device description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDocument {
    pub name: String,
    pub mapping: DeviceMapping,
}

/// Device name to mapping. Read-only once loaded.
pub type DeviceMap = BTreeMap<String, DeviceMapping>;

/// Parse and validate one device description.
pub fn parse_device_document(json: &str, origin: &str) -> Result<DeviceDocument, LoadError> {
    let json_err = |source| LoadError::Json {
        origin: origin.to_string(),
        source,
    };
    let value: Value = serde_json::from_str(json).map_err(json_err)?;
    validate_device_value(&value, origin)?;
    serde_json::from_value(value).map_err(json_err)
}

/// Load every `*.json` file in `dir`, in file name order.
///
/// A later file declaring an already known device name replaces it.
pub fn load_devices(dir: impl AsRef<Path>) -> Result<DeviceMap, LoadError> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| LoadError::io(dir, e))? {
        let path = entry.map_err(|e| LoadError::io(dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut devices = DeviceMap::new();
    for path in paths {
        let text = std::fs::read_to_string(&path).map_err(|e| LoadError::io(&path, e))?;
        let document = parse_device_document(&text, &path.display().to_string())?;
        tracing::debug!(device = %document.name, path = %path.display(), "loaded device");
        if devices.insert(document.name.clone(), document.mapping).is_some() {
            tracing::warn!(device = %document.name, path = %path.display(), "overwriting device");
        }
    }
    tracing::info!(dir = %dir.display(), devices = devices.len(), "loaded devices");
    Ok(devices)
}

/// Mapping for `node`: looked up by tag first, then by id.
pub fn device_for<'a>(devices: &'a DeviceMap, node: &TreeNode) -> Option<&'a DeviceMapping> {
    devices
        .get(&node.tag)
        .or_else(|| node.id.as_ref().and_then(|id| devices.get(id)))
}

/// Fail when two placed devices write the same absolute address.
pub fn check_address_conflicts(tree: &TreeNode, devices: &DeviceMap) -> Result<(), LoadError> {
    let mut owners: BTreeMap<u32, String> = BTreeMap::new();
    for node in tree.walk() {
        let Some(mapping) = device_for(devices, node) else {
            continue;
        };
        let label = node.label();
        for chan in mapping.channels() {
            let address = u32::from(node.offset) + u32::from(chan);
            if let Some(other) = owners.get(&address) {
                return Err(LoadError::DuplicateAddress {
                    address: u16::try_from(address).unwrap_or(u16::MAX),
                    node: label,
                    other: other.clone(),
                });
            }
            owners.insert(address, label.clone());
        }
    }
    Ok(())
}
