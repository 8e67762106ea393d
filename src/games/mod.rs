//! Reference game implementations.

pub mod kuhn;
