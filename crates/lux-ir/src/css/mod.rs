//! DSS: the restricted, CSS-like stylesheet grammar driving fixtures.

mod animation;
mod keyframes;
mod parser;
mod properties;
mod types;
mod values;

use std::path::Path;

use crate::error::LoadError;

pub use animation::{parse_animation, parse_transition};
pub use keyframes::parse_keyframe_frames;
pub use parser::{parse_declaration, parse_declarations, parse_selector, parse_stylesheet};
pub use properties::{
    Auto, Color, Pulse, Rotation, RotationMode, Strobe, StyleValue, parse_auto, parse_color,
    parse_pulse, parse_rotation, parse_strobe,
};
pub use types::{
    Animation, AnimationSet, Declaration, Direction, IterationCount, Keyframe, KeyframeRule,
    Property, Rule, Selector, Stylesheet, TimingFunction, Transition, TransitionSet,
};
pub use values::{
    is_identifier, parse_direction, parse_iteration_count, parse_ratio, parse_time,
    parse_timing_function,
};

/// Read and parse a stylesheet file.
pub fn load_stylesheet(path: impl AsRef<Path>) -> Result<Stylesheet, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let sheet = parse_stylesheet(&text).map_err(|source| LoadError::Parse {
        origin: path.display().to_string(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        rules = sheet.rules.len(),
        keyframes = sheet.keyframes.len(),
        "loaded stylesheet"
    );
    Ok(sheet)
}
