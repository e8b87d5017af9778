//! Intermediate representation for lux shows.
//!
//! This crate turns the three inputs of a show into typed data:
//! - **Stylesheet** (`style.css`): the DSS grammar, parsed into [`Stylesheet`]
//! - **Scene tree** (`tree.xml` / `tree.json`): parsed into [`TreeNode`]
//! - **Devices** (`devices/*.json`): validated against the device schema and
//!   parsed into a [`DeviceMap`]
//!
//! Evaluation over time lives in `lux-scene`; nothing in here depends on a clock.

pub mod css;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod tree;

pub use css::{
    Animation, AnimationSet, Auto, Color, Declaration, Direction, IterationCount, Keyframe,
    KeyframeRule, Property, Pulse, Rotation, RotationMode, Rule, Selector, StyleValue, Strobe,
    Stylesheet, TimingFunction, Transition, TransitionSet, load_stylesheet, parse_stylesheet,
};
pub use device::{
    Channel, DeviceDocument, DeviceMap, DeviceMapping, EnumChannel, check_address_conflicts,
    device_for, load_devices, parse_device_document,
};
pub use error::{LoadError, ParseError};
pub use tree::{NodeStyle, TreeNode, load_tree};
