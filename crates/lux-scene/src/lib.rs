//! lux-scene: turns a styled scene tree into DMX frames over time.
//!
//! The pipeline for one tick is pure and driven by the absolute show time:
//!
//! ```text
//! TreeNode + Stylesheet ──cascade──▶ styled TreeNode
//!     styled TreeNode + t ──style──▶ ResolvedStyle per node
//!     ResolvedStyle + DeviceMap ──frame──▶ [(address, value)] ──▶ DmxFrame
//! ```
//!
//! [`Runner`] drives the pipeline from a [`Ticker`] and hands each changed
//! frame to its [`FrameSink`]s.

pub mod animation;
pub mod cascade;
pub mod error;
pub mod frame;
pub mod runner;
pub mod style;
pub mod ticker;

pub use animation::{Easing, Interpolate, KeyframeMap, compute_animations};
pub use cascade::apply_stylesheet;
pub use error::{EvalError, FrameError, PreflightError, SinkError};
pub use frame::{DmxFrame, UNIVERSE_SIZE, compute_frame, encode};
pub use runner::{FrameSink, Runner, TickReport};
pub use style::{ResolvedStyle, compute_style};
pub use ticker::Ticker;
