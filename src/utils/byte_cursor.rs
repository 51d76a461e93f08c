use crate::err::DeserializationResult;
use crate::model::AnsiStr;
use crate::utils::bytes;

/// A lightweight forward-only cursor over an immutable byte slice.
///
/// This is the slice/offset equivalent of `Cursor<&[u8]>`, used to walk 16-bit dialog templates.
/// There is no length field anywhere in the legacy format, so every read is bounds-checked and the
/// cursor position is the only record of how much of the template has been consumed.
///
/// All reads are little-endian and advance the cursor on success. A failed read leaves the cursor
/// where it was.
#[derive(Clone, Copy, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    #[inline]
    pub fn advance(&mut self, n: usize, what: &'static str) -> DeserializationResult<()> {
        let _ = bytes::slice_r(self.buf, self.pos, n, what)?;
        self.pos += n;
        Ok(())
    }

    #[inline]
    pub fn take_bytes(&mut self, len: usize, what: &'static str) -> DeserializationResult<&'a [u8]> {
        let out = bytes::slice_r(self.buf, self.pos, len, what)?;
        self.pos += len;
        Ok(out)
    }

    /// Look at the next byte without consuming it.
    #[inline]
    pub fn peek_u8(&self, what: &'static str) -> DeserializationResult<u8> {
        bytes::read_u8_r(self.buf, self.pos, what)
    }

    #[inline]
    pub fn u8(&mut self) -> DeserializationResult<u8> {
        self.u8_named("u8")
    }

    #[inline]
    pub fn u8_named(&mut self, what: &'static str) -> DeserializationResult<u8> {
        let b = bytes::read_u8_r(self.buf, self.pos, what)?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    pub fn u16(&mut self) -> DeserializationResult<u16> {
        self.u16_named("u16")
    }

    #[inline]
    pub fn u16_named(&mut self, what: &'static str) -> DeserializationResult<u16> {
        let v = bytes::read_u16_le_r(self.buf, self.pos, what)?;
        self.pos += 2;
        Ok(v)
    }

    #[inline]
    pub fn i16_named(&mut self, what: &'static str) -> DeserializationResult<i16> {
        Ok(self.u16_named(what)? as i16)
    }

    #[inline]
    pub fn u32(&mut self) -> DeserializationResult<u32> {
        self.u32_named("u32")
    }

    #[inline]
    pub fn u32_named(&mut self, what: &'static str) -> DeserializationResult<u32> {
        let v = bytes::read_u32_le_r(self.buf, self.pos, what)?;
        self.pos += 4;
        Ok(v)
    }

    /// Read a NUL-terminated narrow string.
    ///
    /// Consumes the terminator; the returned string does not include it.
    pub fn c_str(&mut self, what: &'static str) -> DeserializationResult<AnsiStr<'a>> {
        let s = bytes::c_str_r(self.buf, self.pos, what)?;
        self.pos += s.len() + 1;
        Ok(AnsiStr::new(s))
    }

    /// Shorthand for the `0xFF <u16>` ordinal escape shared by menu references and window names.
    ///
    /// Returns `None` (consuming nothing) when the next byte is not the escape.
    pub(crate) fn ordinal_escape(&mut self, what: &'static str) -> DeserializationResult<Option<u16>> {
        if self.peek_u8(what)? != 0xff {
            return Ok(None);
        }
        let ordinal = bytes::read_u16_le_r(self.buf, self.pos + 1, what)?;
        self.pos += 3;
        Ok(Some(ordinal))
    }
}
