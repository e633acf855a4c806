//! Shared helpers for the output side of the generator.

pub mod fs;
