//! iconv(3) backend

use std::io;

use libc::{c_char, size_t};
use tracing::warn;

use super::{Converter, Step};
use crate::{ConversionFailure, EncodingName, Error, Result};

mod ffi {
    use libc::{c_char, c_int, c_void, size_t};

    #[allow(non_camel_case_types)]
    pub type iconv_t = *mut c_void;

    #[cfg_attr(any(target_os = "macos", target_os = "ios"), link(name = "iconv"))]
    unsafe extern "C" {
        pub fn iconv_open(tocode: *const c_char, fromcode: *const c_char) -> iconv_t;
        pub fn iconv(
            cd: iconv_t,
            inbuf: *mut *mut c_char,
            inbytesleft: *mut size_t,
            outbuf: *mut *mut c_char,
            outbytesleft: *mut size_t,
        ) -> size_t;
        pub fn iconv_close(cd: iconv_t) -> c_int;
    }
}

/// Conversion descriptor from `iconv_open`, closed on drop.
///
/// Holds a raw pointer, so it is neither `Send` nor `Sync`.
pub struct IconvConverter {
    cd: ffi::iconv_t,
    source: EncodingName,
}

impl IconvConverter {
    /// Source encoding this descriptor was opened for
    pub fn source(&self) -> &EncodingName {
        &self.source
    }
}

impl Converter for IconvConverter {
    fn open(target: &EncodingName, source: &EncodingName) -> Result<Self> {
        // iconv treats "" as the locale charset; callers must name one
        for name in [target, source] {
            if name.as_str().is_empty() {
                return Err(Error::unsupported(name));
            }
        }
        let to = target.to_c_string()?;
        let from = source.to_c_string()?;
        // SAFETY: both arguments are valid NUL-terminated strings
        let cd = unsafe { ffi::iconv_open(to.as_ptr(), from.as_ptr()) };
        if cd as isize == -1 {
            return Err(Error::unsupported(source));
        }
        Ok(Self {
            cd,
            source: source.clone(),
        })
    }

    fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        let mut in_ptr = input.as_ptr() as *mut c_char;
        let mut in_left: size_t = input.len();
        let mut out_ptr = output.as_mut_ptr() as *mut c_char;
        let mut out_left: size_t = output.len();
        // SAFETY: pointers and lengths describe live slices; iconv never
        // writes through the input pointer
        let res = unsafe {
            ffi::iconv(
                self.cd,
                &mut in_ptr,
                &mut in_left,
                &mut out_ptr,
                &mut out_left,
            )
        };
        let consumed = input.len() - in_left;
        let produced = output.len() - out_left;
        if res as isize != -1 {
            return Step::finished(consumed, produced);
        }

        let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
        match errno {
            libc::E2BIG => Step::output_full(consumed, produced),
            libc::EILSEQ => Step::failed(consumed, produced, ConversionFailure::InvalidSequence),
            libc::EINVAL => {
                Step::failed(consumed, produced, ConversionFailure::IncompleteSequence)
            }
            other => Step::failed(consumed, produced, ConversionFailure::System(other)),
        }
    }
}

impl Drop for IconvConverter {
    fn drop(&mut self) {
        // SAFETY: cd came from a successful iconv_open and is closed once
        if unsafe { ffi::iconv_close(self.cd) } != 0 {
            warn!(
                charset = %self.source,
                "iconv_close returned error: {}",
                io::Error::last_os_error()
            );
        }
    }
}
