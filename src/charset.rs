//! Encoding names as supplied by callers (MIME `charset=` parameters and the like)

use std::borrow::Cow;
use std::ffi::CString;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Error, Result};

/// Name of a character encoding, e.g. `"UTF-8"`, `"GB18030"` or `"big5"`.
///
/// Comparison and hashing ignore ASCII case; no other normalization is done,
/// so `"UTF8"` and `"UTF-8"` are different names.
#[derive(Debug, Clone, Eq)]
pub struct EncodingName(Cow<'static, str>);

impl EncodingName {
    /// UTF-8, the target of every decode
    pub const UTF8: EncodingName = EncodingName(Cow::Borrowed("UTF-8"));

    /// Wrap a name
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// The name as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL-terminated copy for native backends.
    ///
    /// A name with an interior NUL can never name a native encoding.
    pub(crate) fn to_c_string(&self) -> Result<CString> {
        CString::new(self.as_str()).map_err(|_| Error::unsupported(self))
    }
}

impl PartialEq for EncodingName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl PartialEq<str> for EncodingName {
    fn eq(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for EncodingName {
    fn eq(&self, other: &&str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl Hash for EncodingName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xFF);
    }
}

impl fmt::Display for EncodingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EncodingName {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_owned()))
    }
}

impl From<String> for EncodingName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&EncodingName> for EncodingName {
    fn from(name: &EncodingName) -> Self {
        name.clone()
    }
}
