//! Typed records shared across the capture and retrieval layers.

pub mod message;
