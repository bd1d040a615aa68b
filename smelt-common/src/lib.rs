//! Shared data model for the Smelt shader pipeline.
//!
//! Smelt compiles a library of reusable HLSL source fragments into concrete
//! vertex/pixel shader permutations. This crate holds everything both the
//! generator and the tooling need to agree on:
//!
//! - [`formats`] — the binary container codec (fragment libraries, shader
//!   libraries, compiled shader records) with versioned field layouts
//! - [`shader_data`] — the semantic uniform registry mapping symbolic names
//!   to slot ids and dependency flags
//! - [`channels`] — the fixed per-vertex/per-pixel channel bit layout shared
//!   by fragment masks and the source assembler
//!
//! Everything here is synchronous and free of shared mutable state; decoded
//! containers are plain owned values and may be processed concurrently on
//! independent handles.

pub mod channels;
pub mod formats;
pub mod shader_data;
