//! Shader fragment record.

use super::FormatError;
use super::io::{Reader, Writer};
use super::uniform::UniformDescriptor;

/// Flag bit: the fragment record ends with a length-prefixed name.
pub const FRAGMENT_HAS_NAME: u8 = 0x1;

/// Which fragment table a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentStage {
    Vertex,
    Pixel,
}

/// One reusable shader code unit.
///
/// Immutable once decoded; addressed by its 1-based position in the
/// per-library fragment table (index 0 is the "no fragment" sentinel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFragment {
    pub stage: FragmentStage,
    /// Channel mask of per-vertex/per-pixel inputs the fragment reads.
    pub input: u32,
    /// Channel mask of outputs the fragment writes.
    pub output: u32,
    /// Vertex fragments: number of output texcoord channels contributed.
    pub texcoord_count: u8,
    /// Vertex fragments: component width of each contributed texcoord.
    pub texcoord_components: u8,
    /// Record flags; bit 0x1 is the has-name bit (kept in sync on write).
    pub flags: u8,
    /// Body statements spliced into the assembled `main`.
    pub main_code: String,
    /// Declarations (samplers, helper functions) emitted before `main`.
    pub declare_code: String,
    /// Uniforms the fragment binds, in declaration order.
    pub uniforms: Vec<UniformDescriptor>,
    /// Authoring name, when the has-name bit is set.
    pub name: Option<String>,
}

impl ShaderFragment {
    pub(crate) fn read(r: &mut Reader<'_>, stage: FragmentStage) -> Result<Self, FormatError> {
        let input = r.read_u32()?;
        let output = r.read_u32()?;
        let (texcoord_count, texcoord_components, flags) = match stage {
            FragmentStage::Vertex => (r.read_u8()?, r.read_u8()?, r.read_u8()?),
            FragmentStage::Pixel => (0, 0, r.read_u8()?),
        };
        let main_code = r.read_string()?;
        let declare_code = r.read_string()?;

        let count = r.read_u32()?;
        // Named descriptor: 4-byte name prefix + 4 shorts + 1 int minimum.
        r.check_count("fragment uniform", count, 16)?;
        let mut uniforms = Vec::with_capacity(count as usize);
        for _ in 0..count {
            uniforms.push(UniformDescriptor::read_named(r)?);
        }

        let name = if flags & FRAGMENT_HAS_NAME != 0 {
            Some(r.read_string()?)
        } else {
            None
        };

        Ok(Self {
            stage,
            input,
            output,
            texcoord_count,
            texcoord_components,
            flags,
            main_code,
            declare_code,
            uniforms,
            name,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.put_u32(self.input);
        w.put_u32(self.output);
        let flags = match self.name {
            Some(_) => self.flags | FRAGMENT_HAS_NAME,
            None => self.flags & !FRAGMENT_HAS_NAME,
        };
        match self.stage {
            FragmentStage::Vertex => {
                w.put_u8(self.texcoord_count);
                w.put_u8(self.texcoord_components);
                w.put_u8(flags);
            }
            FragmentStage::Pixel => w.put_u8(flags),
        }
        w.put_string(&self.main_code);
        w.put_string(&self.declare_code);
        w.put_u32(self.uniforms.len() as u32);
        for uniform in &self.uniforms {
            uniform.write_named(w);
        }
        if let Some(name) = &self.name {
            w.put_string(name);
        }
    }

    /// Encode this record on its own, outside a container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.finish()
    }
}
