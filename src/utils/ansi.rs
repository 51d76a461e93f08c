use encoding::{DecoderTrap, EncodingRef};

use crate::err::{WidenError, WidenResult};
use crate::model::AnsiStr;

/// Decode narrow text with `codec`.
///
/// Unmappable bytes become U+FFFD.
pub(crate) fn decode_ansi(
    s: AnsiStr<'_>,
    codec: EncodingRef,
    what: &'static str,
) -> WidenResult<String> {
    codec
        .decode(s.as_bytes(), DecoderTrap::Replace)
        .map_err(|m| WidenError::AnsiDecode {
            what,
            encoding: codec.name(),
            message: m.into_owned(),
        })
}

/// Decode narrow text with `codec` into UTF-16 code units, without a terminator.
pub(crate) fn ansi_to_utf16(
    s: AnsiStr<'_>,
    codec: EncodingRef,
    what: &'static str,
) -> WidenResult<Vec<u16>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    Ok(decode_ansi(s, codec, what)?.encode_utf16().collect())
}
