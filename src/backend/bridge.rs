//! Two-hop codepage bridge: source bytes to UTF-16, then UTF-16 to target bytes
//!
//! Windows has no generic byte-to-byte conversion between arbitrary
//! codepages, so every conversion goes through wide characters. Unicode
//! codepages are handled here directly (Win32 refuses 1200/1201/12000/12001);
//! legacy codepages are delegated to a [`WidePass`].
//!
//! The bridge is not incremental. Each `convert` call handles the whole input
//! as one unit and either writes the full result or reports
//! [`Outcome::OutputFull`](super::Outcome::OutputFull) with nothing consumed
//! and nothing produced.

use super::{Converter, Step};
use crate::codepage::{CodePage, codepage_from_name};
use crate::{ConversionFailure, EncodingName, Error, Result};

/// Legacy codepage <-> UTF-16 primitive
pub trait WidePass {
    /// Decode `input` in `codepage` to UTF-16; `None` on invalid input or unknown codepage
    fn to_wide(&self, codepage: CodePage, input: &[u8]) -> Option<Vec<u16>>;

    /// Encode UTF-16 into `codepage`; `None` on failure
    fn from_wide(&self, codepage: CodePage, wide: &[u16]) -> Option<Vec<u8>>;
}

/// Converter between two codepages from the static table
#[derive(Debug)]
pub struct CodepageBridge<P> {
    from: CodePage,
    to: CodePage,
    pass: P,
}

impl<P: WidePass> CodepageBridge<P> {
    /// Bridge between two resolved codepages with an explicit pass
    pub fn with_pass(from: CodePage, to: CodePage, pass: P) -> Self {
        Self { from, to, pass }
    }

    /// Source codepage
    pub fn from_codepage(&self) -> CodePage {
        self.from
    }

    /// Target codepage
    pub fn to_codepage(&self) -> CodePage {
        self.to
    }

    fn decode_wide(&self, input: &[u8]) -> Option<Vec<u16>> {
        match self.from {
            CodePage::UTF8 => Some(std::str::from_utf8(input).ok()?.encode_utf16().collect()),
            CodePage::UTF16LE => utf16_units(input, u16::from_le_bytes),
            CodePage::UTF16BE => utf16_units(input, u16::from_be_bytes),
            CodePage::UTF32LE => utf32_to_wide(input, u32::from_le_bytes),
            CodePage::UTF32BE => utf32_to_wide(input, u32::from_be_bytes),
            legacy => self.pass.to_wide(legacy, input),
        }
    }

    fn encode_wide(&self, wide: &[u16]) -> Option<Vec<u8>> {
        match self.to {
            CodePage::UTF8 => Some(String::from_utf16(wide).ok()?.into_bytes()),
            CodePage::UTF16LE => Some(wide.iter().flat_map(|u| u.to_le_bytes()).collect()),
            CodePage::UTF16BE => Some(wide.iter().flat_map(|u| u.to_be_bytes()).collect()),
            CodePage::UTF32LE => wide_to_utf32(wide, u32::to_le_bytes),
            CodePage::UTF32BE => wide_to_utf32(wide, u32::to_be_bytes),
            legacy => self.pass.from_wide(legacy, wide),
        }
    }
}

impl<P: WidePass + Default> Converter for CodepageBridge<P> {
    fn open(target: &EncodingName, source: &EncodingName) -> Result<Self> {
        let from = codepage_from_name(source.as_str()).ok_or_else(|| Error::unsupported(source))?;
        let to = codepage_from_name(target.as_str()).ok_or_else(|| Error::unsupported(target))?;
        Ok(Self::with_pass(from, to, P::default()))
    }

    fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        if input.is_empty() {
            return Step::finished(0, 0);
        }
        let Some(wide) = self.decode_wide(input) else {
            return Step::failed(0, 0, ConversionFailure::InvalidSequence);
        };
        let Some(encoded) = self.encode_wide(&wide) else {
            return Step::failed(0, 0, ConversionFailure::InvalidSequence);
        };
        if encoded.len() > output.len() {
            return Step::output_full(0, 0);
        }
        output[..encoded.len()].copy_from_slice(&encoded);
        Step::finished(input.len(), encoded.len())
    }
}

fn utf16_units(input: &[u8], unit: fn([u8; 2]) -> u16) -> Option<Vec<u16>> {
    let chunks = input.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return None;
    }
    Some(chunks.map(|c| unit([c[0], c[1]])).collect())
}

fn utf32_to_wide(input: &[u8], unit: fn([u8; 4]) -> u32) -> Option<Vec<u16>> {
    let chunks = input.chunks_exact(4);
    if !chunks.remainder().is_empty() {
        return None;
    }
    let mut wide = Vec::with_capacity(input.len() / 2);
    let mut buf = [0u16; 2];
    for c in chunks {
        let ch = char::from_u32(unit([c[0], c[1], c[2], c[3]]))?;
        wide.extend_from_slice(ch.encode_utf16(&mut buf));
    }
    Some(wide)
}

fn wide_to_utf32(wide: &[u16], bytes: fn(u32) -> [u8; 4]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(wide.len() * 4);
    for ch in char::decode_utf16(wide.iter().copied()) {
        out.extend_from_slice(&bytes(ch.ok()? as u32));
    }
    Some(out)
}

/// [`WidePass`] over `MultiByteToWideChar` / `WideCharToMultiByte`
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Pass;

#[cfg(windows)]
impl WidePass for Win32Pass {
    fn to_wide(&self, codepage: CodePage, input: &[u8]) -> Option<Vec<u16>> {
        use windows_sys::Win32::Globalization::{MB_ERR_INVALID_CHARS, MultiByteToWideChar};

        let len = i32::try_from(input.len()).ok()?;
        // SAFETY: a null output buffer with zero length only queries the size
        let wide_len = unsafe {
            MultiByteToWideChar(
                codepage.get(),
                MB_ERR_INVALID_CHARS,
                input.as_ptr(),
                len,
                std::ptr::null_mut(),
                0,
            )
        };
        if wide_len <= 0 {
            return None;
        }
        let mut wide = vec![0u16; wide_len as usize];
        // SAFETY: `wide` holds exactly `wide_len` units
        let written = unsafe {
            MultiByteToWideChar(
                codepage.get(),
                MB_ERR_INVALID_CHARS,
                input.as_ptr(),
                len,
                wide.as_mut_ptr(),
                wide_len,
            )
        };
        if written <= 0 {
            return None;
        }
        wide.truncate(written as usize);
        Some(wide)
    }

    fn from_wide(&self, codepage: CodePage, wide: &[u16]) -> Option<Vec<u8>> {
        use windows_sys::Win32::Globalization::WideCharToMultiByte;

        let len = i32::try_from(wide.len()).ok()?;
        // SAFETY: size query, no output is written
        let out_len = unsafe {
            WideCharToMultiByte(
                codepage.get(),
                0,
                wide.as_ptr(),
                len,
                std::ptr::null_mut(),
                0,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        if out_len <= 0 {
            return None;
        }
        let mut out = vec![0u8; out_len as usize];
        // SAFETY: `out` holds exactly `out_len` bytes
        let written = unsafe {
            WideCharToMultiByte(
                codepage.get(),
                0,
                wide.as_ptr(),
                len,
                out.as_mut_ptr(),
                out_len,
                std::ptr::null(),
                std::ptr::null_mut(),
            )
        };
        if written <= 0 {
            return None;
        }
        out.truncate(written as usize);
        Some(out)
    }
}
