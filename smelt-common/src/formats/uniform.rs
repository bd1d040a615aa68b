//! Uniform descriptor record.

use super::FormatError;
use super::io::{Reader, Writer};

/// One uniform binding: symbolic slot id, secondary id, register size in
/// 4-component units, hardware register, and dependency flags.
///
/// Two wire encodings exist:
/// - **compiled** (inside [`super::CompiledShader`]): four shorts and an
///   int, 12 bytes, no name;
/// - **named** (inside [`super::ShaderFragment`]): a length-prefixed name
///   followed by the same four shorts and int.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDescriptor {
    /// Resolved symbolic name; present only in the named encoding.
    pub name: Option<String>,
    /// Symbolic slot id (see `shader_data`).
    pub data_index: i16,
    /// Secondary slot id.
    pub secondary_index: i16,
    /// Register size in 4-component units.
    pub register_size: i16,
    /// Hardware register, or the assembler's positional allocation.
    pub register: i16,
    /// Dependency flags (see `shader_data`).
    pub flags: i32,
}

impl UniformDescriptor {
    pub(crate) fn read_compiled(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        Ok(Self {
            name: None,
            data_index: r.read_i16()?,
            secondary_index: r.read_i16()?,
            register_size: r.read_i16()?,
            register: r.read_i16()?,
            flags: r.read_i32()?,
        })
    }

    pub(crate) fn write_compiled(&self, w: &mut Writer) {
        w.put_i16(self.data_index);
        w.put_i16(self.secondary_index);
        w.put_i16(self.register_size);
        w.put_i16(self.register);
        w.put_i32(self.flags);
    }

    pub(crate) fn read_named(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        let name = r.read_string()?;
        let mut descriptor = Self::read_compiled(r)?;
        descriptor.name = Some(name);
        Ok(descriptor)
    }

    pub(crate) fn write_named(&self, w: &mut Writer) {
        w.put_string(self.name.as_deref().unwrap_or(""));
        self.write_compiled(w);
    }
}
