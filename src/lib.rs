// src/lib.rs
//! Snapforge
//!
//! Pointer, snapping and drag/attach logic for assembling 3D parts. The
//! engine steps one interaction frame at a time and leaves rendering and
//! windowing to the host.

pub mod config;
pub mod drag;
pub mod engine;
pub mod error;
pub mod gfx;
pub mod input;
pub mod pointer;
pub mod prelude;
pub mod snap;

// Re-export main types for convenience
pub use engine::{FrameReport, SnapEngine};
pub use error::{Result, SnapError};
