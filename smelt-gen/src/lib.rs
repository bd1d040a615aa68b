//! Shader permutation generation for the Smelt pipeline.
//!
//! Takes the containers from `smelt-common` through the build steps:
//!
//! 1. [`admission`] — decide whether one selector is skipped, always
//!    included, or runtime-dependent under the accumulated flag state
//! 2. [`combinations`] — enumerate every admissible ordered fragment-index
//!    sequence for one selector list
//! 3. [`assembler`] — concatenate one combination's fragments into a single
//!    compilable HLSL source with renumbered registers, texcoord channels
//!    and sampler slots
//! 4. [`compiler`] — drive the external shader compiler and disassemble the
//!    constant table of the bytecode it produces
//!
//! All of it is synchronous and pure apart from [`compiler`], which spawns
//! one blocking subprocess per invocation; run independent invocations on
//! separate threads when parallelism is needed.

pub mod admission;
pub mod assembler;
pub mod combinations;
pub mod compiler;

pub use admission::{Admission, admit};
pub use assembler::{AssembleError, AssembledSource, assemble, resolve_signature};
pub use combinations::{Combination, enumerate};
pub use compiler::{CompileError, ExternalCompiler, extract_uniforms};
