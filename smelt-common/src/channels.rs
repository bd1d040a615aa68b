//! Fixed vertex/pixel channel bit layout.
//!
//! A shader fragment's `input`/`output` masks use this layout. The bit
//! assignment is part of the container format itself (it is what fragments
//! on disk were authored against), so it lives next to the codec rather
//! than in the generator.

/// One interpolated channel of an assembled shader's structs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Bit index in a fragment's `input`/`output` mask.
    pub bit: u32,
    /// Field name inside the generated `cIn`/`cCurrent`/`cOut` structs.
    pub field: &'static str,
    /// HLSL type of the field.
    pub ty: &'static str,
    /// HLSL semantic attached to the field in `cIn`/`cOut`.
    pub semantic: &'static str,
}

const fn ch(bit: u32, field: &'static str, ty: &'static str, semantic: &'static str) -> Channel {
    Channel {
        bit,
        field,
        ty,
        semantic,
    }
}

/// Bit index of the first texcoord channel; texcoord `n` is bit
/// `TEXCOORD_BASE_BIT + n`.
pub const TEXCOORD_BASE_BIT: u32 = 8;

/// Number of texcoord channels the format carries.
pub const TEXCOORD_CHANNELS: u32 = 8;

/// Channel table in fixed emission order.
///
/// Struct fields, input-copy prologues and output-copy epilogues are always
/// emitted in this order, independent of fragment order.
pub const CHANNELS: [Channel; 16] = [
    ch(0, "position", "float4", "POSITION"),
    ch(1, "normal", "float3", "NORMAL"),
    ch(2, "tangent", "float3", "TANGENT"),
    ch(3, "binormal", "float3", "BINORMAL"),
    ch(4, "color", "float4", "COLOR0"),
    ch(5, "color1", "float4", "COLOR1"),
    ch(6, "indices", "int4", "BLENDINDICES"),
    ch(7, "weights", "float4", "BLENDWEIGHT"),
    ch(8, "texcoord0", "float4", "TEXCOORD0"),
    ch(9, "texcoord1", "float4", "TEXCOORD1"),
    ch(10, "texcoord2", "float4", "TEXCOORD2"),
    ch(11, "texcoord3", "float4", "TEXCOORD3"),
    ch(12, "texcoord4", "float4", "TEXCOORD4"),
    ch(13, "texcoord5", "float4", "TEXCOORD5"),
    ch(14, "texcoord6", "float4", "TEXCOORD6"),
    ch(15, "texcoord7", "float4", "TEXCOORD7"),
];

/// Mask with the bit of texcoord channel `n` set.
pub const fn texcoord_mask(n: u32) -> u32 {
    1 << (TEXCOORD_BASE_BIT + n)
}

/// True if `bit` addresses one of the texcoord channels.
pub const fn is_texcoord_bit(bit: u32) -> bool {
    bit >= TEXCOORD_BASE_BIT && bit < TEXCOORD_BASE_BIT + TEXCOORD_CHANNELS
}
