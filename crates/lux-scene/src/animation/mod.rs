//! Time-based evaluation of style values.
//!
//! ```text
//! TimingFunction ── easing ── bezier (cubic roots, De Casteljau)
//!        │
//!        ├── keyframes   @keyframes sampled at absolute show time
//!        └── transition  base value eased toward the declared value
//!                 │
//!            interpolate (per value kind, truncating to channel bytes)
//! ```

pub mod bezier;
pub mod easing;
pub mod interpolate;
pub mod keyframes;
pub mod transition;

pub use easing::Easing;
pub use interpolate::Interpolate;
pub use keyframes::{KeyframeMap, compute_animations, iteration_progress};
pub use transition::{apply_transition, transition_ratio};
