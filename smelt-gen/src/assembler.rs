//! HLSL source assembly.
//!
//! Concatenates the fragments of one resolved combination into a single
//! compilable source. Fragments are authored against local resource
//! indices (`texcoord0`, `sampler0`, …); stacking them works because every
//! embedded `TEXCOORD<n>` / `sampler<n>` / `register(s<n>)` token is
//! renumbered by the running total contributed by the preceding fragments,
//! and uniform registers are allocated positionally as a running sum of
//! register sizes.

use std::fmt::Write;

use smelt_common::channels::{CHANNELS, TEXCOORD_BASE_BIT, TEXCOORD_CHANNELS, texcoord_mask};
use smelt_common::formats::{
    FragmentLibrary, FragmentStage, SIGNATURE_SLOTS, ShaderFragment, UniformDescriptor,
};
use thiserror::Error;

/// Configuration error while assembling one combination. Fatal to the
/// current build attempt, surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    /// A signature slot references a fragment past the table.
    #[error("fragment index {index} is not in the {stage:?} fragment table")]
    MissingFragment { index: u8, stage: FragmentStage },

    /// Two fragments declare the same texcoord channel with different
    /// component widths.
    #[error(
        "texcoord channel {channel} declared with component width {first} and again with {second}"
    )]
    ChannelConflict { channel: u32, first: u8, second: u8 },
}

/// One assembled combination: the source text plus the merged uniform list
/// with positional registers assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSource {
    pub source: String,
    pub uniforms: Vec<UniformDescriptor>,
}

impl AssembledSource {
    /// Start registers parallel to `uniforms`, as stored in a compiled
    /// shader record.
    pub fn start_registers(&self) -> Vec<i32> {
        self.uniforms.iter().map(|u| u.register as i32).collect()
    }
}

/// Resolve the nonzero prefix of a signature against a fragment library.
pub fn resolve_signature<'a>(
    library: &'a FragmentLibrary,
    stage: FragmentStage,
    signature: &[u8; SIGNATURE_SLOTS],
) -> Result<Vec<&'a ShaderFragment>, AssembleError> {
    signature
        .iter()
        .take_while(|&&index| index != 0)
        .map(|&index| {
            library
                .fragment(stage, index)
                .ok_or(AssembleError::MissingFragment { index, stage })
        })
        .collect()
}

/// Assemble one combination's fragments into a single HLSL source.
pub fn assemble(
    stage: FragmentStage,
    fragments: &[&ShaderFragment],
) -> Result<AssembledSource, AssembleError> {
    let input_mask = fragments.iter().fold(0u32, |m, f| m | f.input);
    let output_mask = fragments.iter().fold(0u32, |m, f| m | f.output);
    check_texcoord_widths(fragments)?;

    let mut src = String::new();
    emit_struct(&mut src, "cIn", input_mask, true);
    emit_struct(&mut src, "cCurrent", input_mask | output_mask, false);
    emit_struct(&mut src, "cOut", output_mask, true);

    let uniforms = emit_uniforms(&mut src, fragments);

    // Per-fragment base offsets: running totals of the texcoord/sampler
    // counts contributed by the preceding fragments.
    let mut texcoord_base = 0u32;
    let mut sampler_base = 0u32;
    let mut bodies = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        if !fragment.declare_code.is_empty() {
            src.push_str(&renumber_code(
                &fragment.declare_code,
                texcoord_base,
                sampler_base,
            ));
            src.push_str("\n\n");
        }
        bodies.push(renumber_code(
            &fragment.main_code,
            texcoord_base,
            sampler_base,
        ));
        texcoord_base += texcoord_contribution(fragment);
        sampler_base += sampler_contribution(fragment);
    }

    src.push_str("cOut main(cIn In)\n{\n");
    src.push_str("    cCurrent current = (cCurrent)0;\n");
    for channel in CHANNELS.iter().filter(|c| input_mask & (1 << c.bit) != 0) {
        let _ = writeln!(src, "    current.{0} = In.{0};", channel.field);
    }
    for body in &bodies {
        src.push('\n');
        for line in body.lines() {
            if line.is_empty() {
                src.push('\n');
            } else {
                let _ = writeln!(src, "    {line}");
            }
        }
    }
    src.push_str("\n    cOut Out;\n");
    for channel in CHANNELS.iter().filter(|c| output_mask & (1 << c.bit) != 0) {
        let _ = writeln!(src, "    Out.{0} = current.{0};", channel.field);
    }
    src.push_str("    return Out;\n}\n");

    tracing::debug!(
        fragments = fragments.len(),
        uniforms = uniforms.len(),
        bytes = src.len(),
        "assembled shader source"
    );
    Ok(AssembledSource {
        source: src,
        uniforms,
    })
}

/// Struct fields appear iff any fragment sets the corresponding bit, in
/// fixed channel order; `cCurrent` carries no semantics.
fn emit_struct(src: &mut String, name: &str, mask: u32, with_semantics: bool) {
    let _ = writeln!(src, "struct {name}\n{{");
    for channel in CHANNELS.iter().filter(|c| mask & (1 << c.bit) != 0) {
        if with_semantics {
            let _ = writeln!(
                src,
                "    {} {} : {};",
                channel.ty, channel.field, channel.semantic
            );
        } else {
            let _ = writeln!(src, "    {} {};", channel.ty, channel.field);
        }
    }
    src.push_str("};\n\n");
}

/// Positional register allocation: each uniform starts at the running sum
/// of the register sizes of every uniform before it, across all fragments
/// in list order. Never name-based, so duplicate names cannot collide.
fn emit_uniforms(src: &mut String, fragments: &[&ShaderFragment]) -> Vec<UniformDescriptor> {
    let mut merged = Vec::new();
    let mut next_register: i32 = 0;
    for fragment in fragments {
        for uniform in &fragment.uniforms {
            let mut uniform = uniform.clone();
            uniform.register = next_register as i16;
            next_register += uniform.register_size as i32;

            let name = match &uniform.name {
                Some(name) => name.clone(),
                None => format!("sd_{:04x}", uniform.data_index as u16),
            };
            let decl = match uniform.register_size {
                1 => format!("float4 {name}"),
                4 => format!("float4x4 {name}"),
                n => format!("float4 {name}[{n}]"),
            };
            let _ = writeln!(
                src,
                "extern uniform {decl} : register(c{});",
                uniform.register
            );
            merged.push(uniform);
        }
    }
    if !merged.is_empty() {
        src.push('\n');
    }
    merged
}

fn check_texcoord_widths(fragments: &[&ShaderFragment]) -> Result<(), AssembleError> {
    let mut widths: [Option<u8>; TEXCOORD_CHANNELS as usize] = [None; TEXCOORD_CHANNELS as usize];
    for fragment in fragments
        .iter()
        .filter(|f| f.stage == FragmentStage::Vertex)
    {
        for channel in 0..TEXCOORD_CHANNELS {
            if fragment.output & texcoord_mask(channel) == 0 {
                continue;
            }
            match widths[channel as usize] {
                None => widths[channel as usize] = Some(fragment.texcoord_components),
                Some(first) if first != fragment.texcoord_components => {
                    return Err(AssembleError::ChannelConflict {
                        channel,
                        first,
                        second: fragment.texcoord_components,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Texcoord channels a fragment contributes to the running base offset.
fn texcoord_contribution(fragment: &ShaderFragment) -> u32 {
    match fragment.stage {
        FragmentStage::Vertex => fragment.texcoord_count as u32,
        // Pixel fragments consume the channels their input mask names.
        FragmentStage::Pixel => {
            (fragment.input >> TEXCOORD_BASE_BIT & ((1 << TEXCOORD_CHANNELS) - 1)).count_ones()
        }
    }
}

/// Sampler slots a fragment contributes: one past the highest local
/// sampler index it references, through either a `sampler<n>` identifier
/// or a `register(s<n>)` binding; zero when it references none.
fn sampler_contribution(fragment: &ShaderFragment) -> u32 {
    let max_declare = max_sampler_index(&fragment.declare_code);
    let max_main = max_sampler_index(&fragment.main_code);
    match max_declare.max(max_main) {
        Some(max) => max + 1,
        None => 0,
    }
}

fn is_ident(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Match `keyword<digits>` at `pos` with identifier boundaries on both
/// sides (so `sampler2D` is a type name, not a slot reference). Returns the
/// parsed index and the total token length.
fn match_indexed_token(bytes: &[u8], pos: usize, keyword: &[u8]) -> Option<(u32, usize)> {
    if pos > 0 && is_ident(bytes[pos - 1]) {
        return None;
    }
    let digits_at = pos + keyword.len();
    if !bytes[pos..].starts_with(keyword) || digits_at >= bytes.len() {
        return None;
    }
    let mut end = digits_at;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_at || (end < bytes.len() && is_ident(bytes[end])) {
        return None;
    }
    // Local indices are single-digit in practice; the parse is still exact.
    let index: u32 = std::str::from_utf8(&bytes[digits_at..end]).ok()?.parse().ok()?;
    Some((index, end - pos))
}

/// Match `register(s<digits>)` at `pos`. Sampler register bindings shift
/// with the same base offset as the `sampler<n>` identifiers they bind;
/// constant registers (`register(c<n>)`) are untouched.
fn match_register_binding(bytes: &[u8], pos: usize) -> Option<(u32, usize)> {
    const BINDING: &[u8] = b"register(s";
    if pos > 0 && is_ident(bytes[pos - 1]) {
        return None;
    }
    if !bytes[pos..].starts_with(BINDING) {
        return None;
    }
    let digits_at = pos + BINDING.len();
    let mut end = digits_at;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_at || bytes.get(end) != Some(&b')') {
        return None;
    }
    let index: u32 = std::str::from_utf8(&bytes[digits_at..end]).ok()?.parse().ok()?;
    Some((index, end + 1 - pos))
}

fn max_sampler_index(code: &str) -> Option<u32> {
    let bytes = code.as_bytes();
    let mut max = None;
    let mut i = 0;
    while i < bytes.len() {
        let hit = match_indexed_token(bytes, i, b"sampler")
            .or_else(|| match_register_binding(bytes, i));
        match hit {
            Some((index, len)) => {
                max = Some(max.map_or(index, |m: u32| m.max(index)));
                i += len;
            }
            None => i += 1,
        }
    }
    max
}

/// Rewrite `TEXCOORD<n>`, `sampler<n>` and `register(s<n>)` tokens by
/// their base offsets, so a declaration like
/// `sampler sampler0 : register(s0);` keeps its identifier and its
/// hardware slot in step when the fragment is stacked after others.
fn renumber_code(code: &str, texcoord_base: u32, sampler_base: u32) -> String {
    if texcoord_base == 0 && sampler_base == 0 {
        return code.to_string();
    }
    let bytes = code.as_bytes();
    let mut out = String::with_capacity(code.len() + 8);
    let mut i = 0;
    while i < bytes.len() {
        if let Some((index, len)) = match_indexed_token(bytes, i, b"TEXCOORD") {
            let _ = write!(out, "TEXCOORD{}", index + texcoord_base);
            i += len;
        } else if let Some((index, len)) = match_indexed_token(bytes, i, b"sampler") {
            let _ = write!(out, "sampler{}", index + sampler_base);
            i += len;
        } else if let Some((index, len)) = match_register_binding(bytes, i) {
            let _ = write!(out, "register(s{})", index + sampler_base);
            i += len;
        } else {
            out.push(bytes[i] as char);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests;
