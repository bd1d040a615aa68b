//! Container roots: fragment libraries and shader libraries.

use super::compiled::CompiledShader;
use super::fragment::{FragmentStage, ShaderFragment};
use super::io::{Reader, Writer};
use super::selector::ShaderFragmentSelector;
use super::{CURRENT_VERSION, FormatError, MIN_VERSION};

/// Sentinel byte terminating a render-type-keyed map.
const MAP_TERMINATOR: u8 = 0xFF;

fn check_version(version: u32) -> Result<(), FormatError> {
    if !(MIN_VERSION..=CURRENT_VERSION).contains(&version) {
        return Err(FormatError::BadVersion(version));
    }
    Ok(())
}

// ============================================================================
// Fragment library
// ============================================================================

/// The fragment tables one shader library's selectors index into.
///
/// Fragment indices are 1-based; index 0 is the "no fragment" sentinel, so
/// slot `i` of a table holds the fragment addressed as `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentLibrary {
    pub version: u32,
    pub vertex_fragments: Vec<ShaderFragment>,
    pub pixel_fragments: Vec<ShaderFragment>,
    pub name: String,
}

impl FragmentLibrary {
    /// Decode one container. Fails without panicking on truncated or
    /// malformed input; the caller abandons this container only.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = Reader::new(bytes);
        let version = r.read_u32()?;
        check_version(version)?;

        let vertex_fragments = read_fragments(&mut r, FragmentStage::Vertex)?;
        let pixel_fragments = read_fragments(&mut r, FragmentStage::Pixel)?;
        let name = r.read_string()?;

        Ok(Self {
            version,
            vertex_fragments,
            pixel_fragments,
            name,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u32(self.version);
        write_fragments(&mut w, &self.vertex_fragments);
        write_fragments(&mut w, &self.pixel_fragments);
        w.put_string(&self.name);
        w.finish()
    }

    /// Resolve a 1-based fragment index; `None` for the 0 sentinel and for
    /// indices past the table.
    pub fn fragment(&self, stage: FragmentStage, index: u8) -> Option<&ShaderFragment> {
        let table = match stage {
            FragmentStage::Vertex => &self.vertex_fragments,
            FragmentStage::Pixel => &self.pixel_fragments,
        };
        match index {
            0 => None,
            i => table.get(i as usize - 1),
        }
    }
}

fn read_fragments(
    r: &mut Reader<'_>,
    stage: FragmentStage,
) -> Result<Vec<ShaderFragment>, FormatError> {
    let count = r.read_u32()?;
    // Smallest fragment: masks + flags byte + two empty strings + empty
    // uniform list.
    r.check_count("fragment", count, 21)?;
    let mut fragments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        fragments.push(ShaderFragment::read(r, stage)?);
    }
    Ok(fragments)
}

fn write_fragments(w: &mut Writer, fragments: &[ShaderFragment]) {
    w.put_u32(fragments.len() as u32);
    for fragment in fragments {
        fragment.write(w);
    }
}

// ============================================================================
// Shader library
// ============================================================================

/// A pre-compiled shader: one vertex/pixel blob pair per render type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardShader {
    pub id: u32,
    /// (render type, vertex shader, pixel shader), in file order.
    pub entries: Vec<(u8, CompiledShader, CompiledShader)>,
    pub name: String,
}

impl StandardShader {
    /// Encode this record on its own, outside a container.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        write_standard_shader(&mut w, self);
        w.finish()
    }
}

/// One render type's selector lists inside a builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    pub render_type: u8,
    pub vertex_selectors: Vec<ShaderFragmentSelector>,
    pub pixel_selectors: Vec<ShaderFragmentSelector>,
}

/// A selector-driven shader: per render type, the ordered admission rules
/// the combination generator walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBuilder {
    pub id: u32,
    pub entries: Vec<SelectorEntry>,
    pub name: String,
}

impl ShaderBuilder {
    /// Encode this record on its own, outside a container.
    pub fn to_bytes(&self, version: u32) -> Vec<u8> {
        let mut w = Writer::new();
        write_builder(&mut w, self, version);
        w.finish()
    }
}

/// Root object of a shader container file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLibrary {
    pub version: u32,
    pub shaders: Vec<StandardShader>,
    pub builders: Vec<ShaderBuilder>,
    /// Two legacy lists retained only for layout compatibility; opaque,
    /// round-tripped untouched.
    pub legacy_a: Vec<Vec<u8>>,
    pub legacy_b: Vec<Vec<u8>>,
    pub name: String,
}

impl ShaderLibrary {
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = Reader::new(bytes);
        let version = r.read_u32()?;
        check_version(version)?;

        let shader_count = r.read_u32()?;
        r.check_count("standard shader", shader_count, 9)?;
        let mut shaders = Vec::with_capacity(shader_count as usize);
        for _ in 0..shader_count {
            shaders.push(read_standard_shader(&mut r)?);
        }

        let builder_count = r.read_u32()?;
        r.check_count("shader builder", builder_count, 9)?;
        let mut builders = Vec::with_capacity(builder_count as usize);
        for _ in 0..builder_count {
            builders.push(read_builder(&mut r, version)?);
        }

        let legacy_a = read_blob_list(&mut r)?;
        let legacy_b = read_blob_list(&mut r)?;
        let name = r.read_string()?;

        Ok(Self {
            version,
            shaders,
            builders,
            legacy_a,
            legacy_b,
            name,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u32(self.version);
        w.put_u32(self.shaders.len() as u32);
        for shader in &self.shaders {
            write_standard_shader(&mut w, shader);
        }
        w.put_u32(self.builders.len() as u32);
        for builder in &self.builders {
            write_builder(&mut w, builder, self.version);
        }
        write_blob_list(&mut w, &self.legacy_a);
        write_blob_list(&mut w, &self.legacy_b);
        w.put_string(&self.name);
        w.finish()
    }
}

fn read_render_type(r: &mut Reader<'_>) -> Result<Option<u8>, FormatError> {
    match r.read_u8()? {
        MAP_TERMINATOR => Ok(None),
        key => Ok(Some(key)),
    }
}

fn read_standard_shader(r: &mut Reader<'_>) -> Result<StandardShader, FormatError> {
    let id = r.read_u32()?;
    let mut entries = Vec::new();
    while let Some(render_type) = read_render_type(r)? {
        let vertex = CompiledShader::read(r)?;
        let pixel = CompiledShader::read(r)?;
        entries.push((render_type, vertex, pixel));
    }
    let name = r.read_string()?;
    Ok(StandardShader { id, entries, name })
}

fn write_standard_shader(w: &mut Writer, shader: &StandardShader) {
    w.put_u32(shader.id);
    for (render_type, vertex, pixel) in &shader.entries {
        debug_assert_ne!(*render_type, MAP_TERMINATOR);
        w.put_u8(*render_type);
        vertex.write(w);
        pixel.write(w);
    }
    w.put_u8(MAP_TERMINATOR);
    w.put_string(&shader.name);
}

fn read_selectors(
    r: &mut Reader<'_>,
    version: u32,
) -> Result<Vec<ShaderFragmentSelector>, FormatError> {
    let count = r.read_u32()?;
    // Unpadded selector size is the floor for both layouts.
    r.check_count("selector", count, 24)?;
    let mut selectors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        selectors.push(ShaderFragmentSelector::read(r, version)?);
    }
    Ok(selectors)
}

fn read_builder(r: &mut Reader<'_>, version: u32) -> Result<ShaderBuilder, FormatError> {
    let id = r.read_u32()?;
    let mut entries = Vec::new();
    while let Some(render_type) = read_render_type(r)? {
        entries.push(SelectorEntry {
            render_type,
            vertex_selectors: read_selectors(r, version)?,
            pixel_selectors: read_selectors(r, version)?,
        });
    }
    let name = r.read_string()?;
    Ok(ShaderBuilder { id, entries, name })
}

fn write_builder(w: &mut Writer, builder: &ShaderBuilder, version: u32) {
    w.put_u32(builder.id);
    for entry in &builder.entries {
        debug_assert_ne!(entry.render_type, MAP_TERMINATOR);
        w.put_u8(entry.render_type);
        w.put_u32(entry.vertex_selectors.len() as u32);
        for selector in &entry.vertex_selectors {
            selector.write(w, version);
        }
        w.put_u32(entry.pixel_selectors.len() as u32);
        for selector in &entry.pixel_selectors {
            selector.write(w, version);
        }
    }
    w.put_u8(MAP_TERMINATOR);
    w.put_string(&builder.name);
}

fn read_blob_list(r: &mut Reader<'_>) -> Result<Vec<Vec<u8>>, FormatError> {
    let count = r.read_u32()?;
    r.check_count("legacy blob", count, 4)?;
    let mut blobs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        blobs.push(r.read_blob()?);
    }
    Ok(blobs)
}

fn write_blob_list(w: &mut Writer, blobs: &[Vec<u8>]) {
    w.put_u32(blobs.len() as u32);
    for blob in blobs {
        w.put_blob(blob);
    }
}
