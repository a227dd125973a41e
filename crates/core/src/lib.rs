//! Domain types and pure logic for the fotomat photo service.
//!
//! Everything here is synchronous and side-effect free apart from font
//! loading in the watermark module. Network and filesystem orchestration
//! live in the `fotomat-comfyui` and `fotomat-pipeline` crates.

pub mod error;
pub mod naming;
pub mod types;
pub mod watermark;
pub mod workflow;
