//! Paleomap Library
//!
//! Query, filter and color engine for maps of ancient-DNA samples.
//! The binary in `main.rs` is a thin CLI over these modules.

pub mod config;
pub mod map;
pub mod memprof;
pub mod pipeline;
