//! Error types for style evaluation, frame compilation and output.

use std::time::Duration;

use lux_ir::LoadError;
use thiserror::Error;

/// Errors raised while resolving a node's style at a point in time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// An `animation` declaration names a keyframe rule that does not exist.
    #[error("no @keyframes named '{name}' (referenced by {node})")]
    MissingKeyframes { name: String, node: String },

    /// A keyframe rule built without a 0% frame, which the parser never emits.
    #[error("@keyframes '{name}' has no 0% frame (referenced by {node})")]
    MissingStartFrame { name: String, node: String },
}

/// Errors raised while compiling the channel list of one tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A device placement puts a channel outside the universe.
    #[error("{node} writes DMX address {address}, outside 1..=512")]
    AddressOutOfRange { node: String, address: u32 },
}

/// Errors reported by a [`FrameSink`](crate::FrameSink).
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport is down and will not be retried before `retry_in`.
    #[error("{name} unavailable, retrying in {}ms", .retry_in.as_millis())]
    Unavailable { name: String, retry_in: Duration },
}

/// Startup checks that make a show unrunnable.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}
