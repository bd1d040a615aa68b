//! External shader compiler adapter.
//!
//! Runs the platform HLSL compiler as a subprocess and disassembles the
//! constant table (`CTAB`) embedded in the produced bytecode back into
//! uniform descriptors, resolved against the semantic data registry.

use std::path::{Path, PathBuf};
use std::process::Command;

use smelt_common::formats::UniformDescriptor;
use smelt_common::shader_data::ShaderDataRegistry;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Default executable name probed on `PATH`.
const DEFAULT_COMPILER: &str = "fxc";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no shader compiler found on PATH (looked for `{DEFAULT_COMPILER}`)")]
    CompilerNotFound,

    #[error("compiler failed on {source_file}:\n{stderr}")]
    CompilerFailed { source_file: PathBuf, stderr: String },

    #[error("bytecode carries no CTAB constant table")]
    MissingConstantTable,

    #[error("constant table read past end of bytecode")]
    Truncated,

    #[error("constant `{name}` is not a registered shader data name")]
    UnknownUniform { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A located external compiler plus the include directory passed to every
/// invocation.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    exe: PathBuf,
    include_dir: PathBuf,
}

impl ExternalCompiler {
    /// Use the given executable, or probe `PATH` for the default one.
    pub fn locate(
        exe: Option<PathBuf>,
        include_dir: PathBuf,
    ) -> Result<ExternalCompiler, CompileError> {
        let exe = match exe {
            Some(exe) => exe,
            None => {
                which::which(DEFAULT_COMPILER).map_err(|_| CompileError::CompilerNotFound)?
            }
        };
        tracing::debug!(exe = %exe.display(), "external shader compiler");
        Ok(ExternalCompiler { exe, include_dir })
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Compile one source file for the given target profile and return the
    /// produced bytecode. The compiler's stderr is carried verbatim on
    /// failure; the temporary output file is removed either way.
    pub fn compile(&self, profile: &str, source: &Path) -> Result<Vec<u8>, CompileError> {
        let object = NamedTempFile::new()?;
        let output = Command::new(&self.exe)
            .arg("-T")
            .arg(profile)
            .arg("-Fo")
            .arg(object.path())
            .arg("-I")
            .arg(&self.include_dir)
            .arg(source)
            .output()?;
        if !output.status.success() {
            return Err(CompileError::CompilerFailed {
                source_file: source.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        let bytecode = std::fs::read(object.path())?;
        tracing::debug!(
            source = %source.display(),
            profile,
            bytes = bytecode.len(),
            "compiled shader"
        );
        Ok(bytecode)
    }
}

// CTAB layout: the tag sits at byte 8 of the bytecode and the comment body
// starts at byte 12; every offset stored in the table is relative to that
// body start.
const CTAB_TAG: &[u8; 4] = b"CTAB";
const CTAB_BASE: usize = 12;
const CTAB_ENTRY_SIZE: usize = 20;

/// Disassemble the constant table of compiled bytecode into uniform
/// descriptors. Constant names must be registered shader data names; the
/// entry's register fields come straight from the table.
pub fn extract_uniforms(
    bytecode: &[u8],
    registry: &ShaderDataRegistry,
) -> Result<Vec<UniformDescriptor>, CompileError> {
    if bytecode.len() < CTAB_BASE || &bytecode[8..12] != CTAB_TAG {
        return Err(CompileError::MissingConstantTable);
    }
    let count = read_u32(bytecode, CTAB_BASE + 12)? as usize;
    let table = read_u32(bytecode, CTAB_BASE + 16)? as usize;
    let table_end = CTAB_BASE
        .checked_add(table)
        .and_then(|at| count.checked_mul(CTAB_ENTRY_SIZE).and_then(|n| at.checked_add(n)))
        .ok_or(CompileError::Truncated)?;
    if table_end > bytecode.len() {
        return Err(CompileError::Truncated);
    }

    let mut uniforms = Vec::with_capacity(count);
    for i in 0..count {
        let entry = CTAB_BASE + table + i * CTAB_ENTRY_SIZE;
        let name_offset = read_u32(bytecode, entry)? as usize;
        let register = read_i16(bytecode, entry + 6)?;
        let register_size = read_i16(bytecode, entry + 8)?;

        let name = read_name(bytecode, CTAB_BASE + name_offset)?;
        let id = registry
            .registered_id(&name)
            .ok_or_else(|| CompileError::UnknownUniform { name: name.clone() })?;
        let data_index = id as i16;
        uniforms.push(UniformDescriptor {
            name: Some(name),
            data_index,
            // No source for a distinct secondary slot in the table.
            secondary_index: data_index,
            register_size,
            register,
            flags: registry.flags_for(id) as i32,
        });
    }
    Ok(uniforms)
}

fn read_u32(buf: &[u8], at: usize) -> Result<u32, CompileError> {
    let bytes = buf
        .get(at..at + 4)
        .ok_or(CompileError::Truncated)?
        .try_into()
        .map_err(|_| CompileError::Truncated)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_i16(buf: &[u8], at: usize) -> Result<i16, CompileError> {
    let bytes = buf
        .get(at..at + 2)
        .ok_or(CompileError::Truncated)?
        .try_into()
        .map_err(|_| CompileError::Truncated)?;
    Ok(i16::from_le_bytes(bytes))
}

fn read_name(buf: &[u8], at: usize) -> Result<String, CompileError> {
    let tail = buf.get(at..).ok_or(CompileError::Truncated)?;
    let end = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(CompileError::Truncated)?;
    Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
}

#[cfg(test)]
mod tests;
