//! Compiled shader record.

use super::FormatError;
use super::io::{Reader, Writer};
use super::uniform::UniformDescriptor;

/// Fixed slot count of the fragment-index signature.
pub const SIGNATURE_SLOTS: usize = 32;

/// A resolved, hardware-bytecode-backed shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledShader {
    /// Zero-terminated fragment-index sequence that produced the blob.
    /// Doubles as the content fingerprint (see [`signature_string`]).
    pub signature: [u8; SIGNATURE_SLOTS],
    /// Opaque hardware bytecode.
    pub bytecode: Vec<u8>,
    /// Uniforms bound to concrete hardware registers. Always the same
    /// length as `start_registers`.
    pub uniforms: Vec<UniformDescriptor>,
    /// Positional start-register allocation parallel to `uniforms`.
    pub start_registers: Vec<i32>,
    /// Record flags word.
    pub flags: i32,
}

/// Fingerprint of a signature: each nonzero entry rendered as a two-digit
/// lowercase hex byte, in order, stopping at the first zero.
///
/// `[5, 12, 0, ...]` → `"050c"`; an all-zero signature → `""`.
pub fn signature_string(signature: &[u8; SIGNATURE_SLOTS]) -> String {
    let end = signature
        .iter()
        .position(|&slot| slot == 0)
        .unwrap_or(SIGNATURE_SLOTS);
    hex::encode(&signature[..end])
}

impl CompiledShader {
    /// Fingerprint of this shader's signature.
    pub fn signature_string(&self) -> String {
        signature_string(&self.signature)
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        let mut signature = [0u8; SIGNATURE_SLOTS];
        for slot in &mut signature {
            *slot = r.read_u8()?;
        }
        let bytecode = r.read_blob()?;

        let count = r.read_u32()?;
        // 12-byte descriptors followed by the same count of start registers.
        r.check_count("compiled uniform", count, 12)?;
        let mut uniforms = Vec::with_capacity(count as usize);
        for _ in 0..count {
            uniforms.push(UniformDescriptor::read_compiled(r)?);
        }
        // Second pass, same count, no second prefix.
        let mut start_registers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            start_registers.push(r.read_i32()?);
        }

        Ok(Self {
            signature,
            bytecode,
            uniforms,
            start_registers,
            flags: r.read_i32()?,
        })
    }

    /// Invariant: `uniforms` and `start_registers` are the same length; the
    /// caller constructs them together.
    pub(crate) fn write(&self, w: &mut Writer) {
        debug_assert_eq!(self.uniforms.len(), self.start_registers.len());
        w.put_bytes(&self.signature);
        w.put_blob(&self.bytecode);
        w.put_u32(self.uniforms.len() as u32);
        for uniform in &self.uniforms {
            uniform.write_compiled(w);
        }
        for &register in &self.start_registers {
            w.put_i32(register);
        }
        w.put_i32(self.flags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompiledShader {
        let mut signature = [0u8; SIGNATURE_SLOTS];
        signature[0] = 5;
        signature[1] = 12;
        CompiledShader {
            signature,
            bytecode: vec![0x00, 0x03, 0xFE, 0xFF],
            uniforms: vec![
                UniformDescriptor {
                    name: None,
                    data_index: 0x001,
                    secondary_index: 0x001,
                    register_size: 4,
                    register: 0,
                    flags: 0x6,
                },
                UniformDescriptor {
                    name: None,
                    data_index: 0x020,
                    secondary_index: 0x020,
                    register_size: 1,
                    register: 4,
                    flags: 0x8,
                },
            ],
            start_registers: vec![0, 4],
            flags: 0x1,
        }
    }

    #[test]
    fn test_round_trip() {
        let shader = sample();
        let mut w = Writer::new();
        shader.write(&mut w);
        let bytes = w.finish();
        let decoded = CompiledShader::read(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, shader);
        assert_eq!(decoded.uniforms.len(), decoded.start_registers.len());
    }

    #[test]
    fn test_signature_string() {
        assert_eq!(sample().signature_string(), "050c");
        assert_eq!(signature_string(&[0u8; SIGNATURE_SLOTS]), "");
        let mut full = [0x10u8; SIGNATURE_SLOTS];
        full[SIGNATURE_SLOTS - 1] = 0xAB;
        assert_eq!(signature_string(&full).len(), SIGNATURE_SLOTS * 2);
        assert!(signature_string(&full).ends_with("ab"));
    }

    #[test]
    fn test_truncated_start_registers_is_an_error() {
        let mut w = Writer::new();
        sample().write(&mut w);
        let mut bytes = w.finish();
        bytes.truncate(bytes.len() - 6);
        assert!(CompiledShader::read(&mut Reader::new(&bytes)).is_err());
    }
}
