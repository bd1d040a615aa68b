//! Fragment selector record.

use super::io::{Reader, Writer};
use super::{FormatError, LAST_PADDED_SELECTOR_VERSION};

/// Predicate kind a selector evaluates against the live render context.
///
/// Closed set: any other wire value is malformed data and is rejected at
/// decode time, so downstream matches stay exhaustive. (The text-authoring
/// layer knows one extra code, 12, that never appears in binary containers.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CheckKind {
    /// Always admitted when reached.
    Unconditional = 0,
    /// Model provides shader data for the slot in operand 0.
    HasData = 1,
    /// Model provides shader data for the slots in operands 0 and 1.
    HasData2 = 2,
    /// Model provides shader data for the slots in all three operands.
    HasData3 = 3,
    /// As [`CheckKind::HasData`], appending the value to a register array.
    HasDataArrayAppend = 4,
    /// Shader data in operand 0 equals the constant in operand 1.
    DataEquals = 5,
    /// Material binds a texture to the sampler slot in operand 0.
    HasSampler = 6,
    /// Object-type color index equals operand 0.
    ObjectTypeColorEquals = 7,
}

impl CheckKind {
    /// Decode the wire value.
    pub fn from_wire(value: u8) -> Result<Self, FormatError> {
        Ok(match value {
            0 => Self::Unconditional,
            1 => Self::HasData,
            2 => Self::HasData2,
            3 => Self::HasData3,
            4 => Self::HasDataArrayAppend,
            5 => Self::DataEquals,
            6 => Self::HasSampler,
            7 => Self::ObjectTypeColorEquals,
            other => return Err(FormatError::UnknownCheckKind(other)),
        })
    }

    /// Encode to the wire value.
    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// One admission rule inside a builder's selector list.
///
/// A `fragment_index` of 0 marks a terminator: the selector contributes no
/// fragment (its flags still apply when admitted). Nonzero indices are
/// 1-based positions in the matching fragment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderFragmentSelector {
    /// 1-based fragment table index; 0 = no fragment.
    pub fragment_index: u8,
    /// Runtime predicate kind.
    pub check_kind: CheckKind,
    /// Predicate operands (slot ids, constants, sampler slots).
    pub operands: [u16; 3],
    /// Vertex-element dependency mask; nonzero makes admission
    /// runtime-dependent.
    pub vertex_usage_flags: u32,
    /// Admitted only if the accumulated state shares a bit with this mask
    /// (when nonzero).
    pub required_flags: u32,
    /// Never admitted if the accumulated state shares a bit with this mask.
    pub excluded_flags: u32,
    /// Bits this selector contributes to the accumulated state when
    /// admitted.
    pub flags: u32,
}

impl ShaderFragmentSelector {
    /// True for the list-terminating "no fragment" rule.
    pub fn is_terminator(&self) -> bool {
        self.fragment_index == 0
    }

    /// Decode one selector. Versions ≤ 6 carry one padding byte after the
    /// check kind and three padding shorts after the operands; later
    /// versions omit them.
    pub(crate) fn read(r: &mut Reader<'_>, version: u32) -> Result<Self, FormatError> {
        let fragment_index = r.read_u8()?;
        let check_kind = CheckKind::from_wire(r.read_u8()?)?;
        if version <= LAST_PADDED_SELECTOR_VERSION {
            let _pad = r.read_u8()?;
        }
        let operands = [r.read_u16()?, r.read_u16()?, r.read_u16()?];
        if version <= LAST_PADDED_SELECTOR_VERSION {
            for _ in 0..3 {
                let _pad = r.read_u16()?;
            }
        }
        Ok(Self {
            fragment_index,
            check_kind,
            operands,
            vertex_usage_flags: r.read_u32()?,
            required_flags: r.read_u32()?,
            excluded_flags: r.read_u32()?,
            flags: r.read_u32()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer, version: u32) {
        w.put_u8(self.fragment_index);
        w.put_u8(self.check_kind.to_wire());
        if version <= LAST_PADDED_SELECTOR_VERSION {
            w.put_u8(0);
        }
        for operand in self.operands {
            w.put_u16(operand);
        }
        if version <= LAST_PADDED_SELECTOR_VERSION {
            for _ in 0..3 {
                w.put_u16(0);
            }
        }
        w.put_u32(self.vertex_usage_flags);
        w.put_u32(self.required_flags);
        w.put_u32(self.excluded_flags);
        w.put_u32(self.flags);
    }
}
