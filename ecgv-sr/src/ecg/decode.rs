//! Upload text decoding
//!
//! UTF-8 first. Exports from older acquisition software are often
//! ISO-8859-1, so bytes that are not valid UTF-8 are decoded once more as
//! Latin-1 (every byte maps to U+0000..U+00FF).

use std::borrow::Cow;

use tracing::debug;

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode uploaded bytes into document text
///
/// Latin-1 never fails byte-wise, so the fallback result is rejected when
/// it contains U+0000: no XML document may contain that character, and it
/// is what UTF-16 or binary uploads look like after a Latin-1 decode.
pub fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match std::str::from_utf8(body) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(utf8_err) => {
            debug!(
                "Upload is not valid UTF-8 ({}), retrying as ISO-8859-1",
                utf8_err
            );
            if let Some(offset) = body.iter().position(|&b| b == 0) {
                return Err(Error::Encoding(format!(
                    "not UTF-8 ({}) and not ISO-8859-1 text (NUL at byte {})",
                    utf8_err, offset
                )));
            }
            Ok(Cow::Owned(body.iter().map(|&b| char::from(b)).collect()))
        }
    }
}
