//! UTF-8 to UTF-16 for Win32 presentation APIs (console, file names)

use crate::backend::bridge::{WidePass, Win32Pass};
use crate::codepage::CodePage;
use crate::{ConversionFailure, Error, Result};

/// Convert `text` to a NUL-terminated UTF-16 buffer.
///
/// Single pass through `MultiByteToWideChar(CP_UTF8)`; there is no retry loop.
pub fn utf8_to_wide(text: &str) -> Result<Vec<u16>> {
    if text.is_empty() {
        return Ok(vec![0]);
    }
    let mut wide = Win32Pass
        .to_wide(CodePage::UTF8, text.as_bytes())
        .ok_or_else(|| Error::Conversion {
            charset: "UTF-8".to_string(),
            offset: 0,
            failure: ConversionFailure::InvalidSequence,
        })?;
    wide.push(0);
    Ok(wide)
}
