//! Loading either container kind from disk.

use std::path::Path;

use anyhow::{Context, Result, bail};
use smelt_common::formats::{FragmentLibrary, ShaderLibrary};

/// A decoded library file of either kind.
pub enum Container {
    Fragments(FragmentLibrary),
    Shaders(ShaderLibrary),
}

/// Read and decode a library file. The two container kinds share only the
/// version header, so the decode that succeeds identifies the kind.
pub fn load(path: &Path) -> Result<Container> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match ShaderLibrary::decode(&bytes) {
        Ok(library) => Ok(Container::Shaders(library)),
        Err(shader_err) => match FragmentLibrary::decode(&bytes) {
            Ok(library) => Ok(Container::Fragments(library)),
            Err(fragment_err) => bail!(
                "{}: not a shader library ({shader_err}) and not a fragment library ({fragment_err})",
                path.display()
            ),
        },
    }
}

/// Load a file that must be a fragment library.
pub fn load_fragments(path: &Path) -> Result<FragmentLibrary> {
    match load(path)? {
        Container::Fragments(library) => Ok(library),
        Container::Shaders(_) => bail!(
            "{}: expected a fragment library, found a shader library",
            path.display()
        ),
    }
}

/// Load a file that must be a shader library.
pub fn load_shaders(path: &Path) -> Result<ShaderLibrary> {
    match load(path)? {
        Container::Shaders(library) => Ok(library),
        Container::Fragments(_) => bail!(
            "{}: expected a shader library, found a fragment library",
            path.display()
        ),
    }
}
