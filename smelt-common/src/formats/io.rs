//! Bounds-checked little-endian cursor primitives shared by the record
//! codecs. Reads fail with [`FormatError`] instead of panicking; writes are
//! infallible appends to a growable buffer.

use super::FormatError;

/// Read cursor over one container's bytes.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, FormatError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16, FormatError> {
        Ok(self.read_u16()? as i16)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, FormatError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(self.read_u32()? as i32)
    }

    /// Validate a declared element count against the remaining input before
    /// any allocation. `min_size` is the smallest possible encoding of one
    /// element.
    pub(crate) fn check_count(
        &self,
        what: &'static str,
        count: u32,
        min_size: usize,
    ) -> Result<(), FormatError> {
        if (count as usize).saturating_mul(min_size) > self.remaining() {
            return Err(FormatError::BadCount { what, count });
        }
        Ok(())
    }

    /// int32 length-prefixed byte blob.
    pub(crate) fn read_blob(&mut self) -> Result<Vec<u8>, FormatError> {
        let len = self.read_u32()?;
        self.check_count("blob byte", len, 1)?;
        Ok(self.take(len as usize)?.to_vec())
    }

    /// int32 length-prefixed ASCII string.
    pub(crate) fn read_string(&mut self) -> Result<String, FormatError> {
        let offset = self.pos;
        let len = self.read_u32()?;
        self.check_count("string byte", len, 1)?;
        let bytes = self.take(len as usize)?;
        if !bytes.is_ascii() {
            return Err(FormatError::NonAsciiString { offset });
        }
        // ASCII is valid UTF-8
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Append-only write buffer.
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_i16(&mut self, v: i16) {
        self.put_u16(v as u16);
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_i32(&mut self, v: i32) {
        self.put_u32(v as u32);
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn put_blob(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.put_bytes(bytes);
    }

    /// int32 length-prefixed string. Callers keep names ASCII; the decoder
    /// rejects anything else.
    pub(crate) fn put_string(&mut self, s: &str) {
        self.put_blob(s.as_bytes());
    }
}
