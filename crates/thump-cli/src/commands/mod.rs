//! CLI command implementations.

pub mod common;
pub mod graph;
pub mod trigger;
pub mod wave;
