//! Rendering module for writing outlines and ranked output.

mod json;

pub use json::{to_json, write_json, JsonFormat};
