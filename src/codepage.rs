//! Static encoding name to Windows codepage table
//!
//! Used by the codepage bridge backend. The table is compiled on every
//! platform so it can be listed and tested anywhere.

use std::fmt;

use serde::Serialize;

/// Windows codepage identifier. Zero is never a valid codepage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CodePage(u32);

impl CodePage {
    /// UTF-8
    pub const UTF8: CodePage = CodePage::from_const(65001);
    /// UTF-16 little endian
    pub const UTF16LE: CodePage = CodePage::from_const(1200);
    /// UTF-16 big endian
    pub const UTF16BE: CodePage = CodePage::from_const(1201);
    /// UTF-32 little endian
    pub const UTF32LE: CodePage = CodePage::from_const(12000);
    /// UTF-32 big endian
    pub const UTF32BE: CodePage = CodePage::from_const(12001);
    /// GBK, the legacy simplified Chinese codepage
    pub const GBK: CodePage = CodePage::from_const(936);
    /// Full GB18030
    pub const GB18030: CodePage = CodePage::from_const(54936);
    /// Big5, traditional Chinese
    pub const BIG5: CodePage = CodePage::from_const(950);
    /// 7-bit US-ASCII
    pub const US_ASCII: CodePage = CodePage::from_const(20127);

    const fn from_const(id: u32) -> Self {
        assert!(id != 0, "codepage 0 is reserved");
        CodePage(id)
    }

    /// Wrap a raw identifier; zero yields `None`
    pub fn new(id: u32) -> Option<Self> {
        (id != 0).then_some(CodePage(id))
    }

    /// Raw identifier as passed to Win32
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CP{}", self.0)
    }
}

static CODEPAGES: &[(&str, CodePage)] = &[
    // Unicode
    ("UTF-8", CodePage::UTF8),
    ("UTF-16LE", CodePage::UTF16LE),
    ("UTF-16BE", CodePage::UTF16BE),
    ("UTF-16", CodePage::UTF16LE),
    ("UTF-32LE", CodePage::UTF32LE),
    ("UTF-32BE", CodePage::UTF32BE),
    ("UTF-32", CodePage::UTF32LE),
    // Chinese
    ("GBK", CodePage::GBK),
    ("GB2312", CodePage::GBK),
    ("GB18030", CodePage::GBK),
    ("GB18030-2000", CodePage::GB18030),
    ("BIG5", CodePage::BIG5),
    // ASCII
    ("ASCII", CodePage::US_ASCII),
    ("US-ASCII", CodePage::US_ASCII),
];

/// Resolve an encoding name to its codepage (ASCII case-insensitive, exact match)
pub fn codepage_from_name(name: &str) -> Option<CodePage> {
    CODEPAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|&(_, cp)| cp)
}

/// All `(name, codepage)` pairs, aliases included
pub fn entries() -> impl Iterator<Item = (&'static str, CodePage)> {
    CODEPAGES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_codepages() {
        assert_eq!(codepage_from_name("UTF-8"), Some(CodePage::UTF8));
        assert_eq!(codepage_from_name("utf-16"), Some(CodePage::UTF16LE));
        assert_eq!(codepage_from_name("Utf-16be"), Some(CodePage::UTF16BE));
        assert_eq!(codepage_from_name("UTF-32").map(CodePage::get), Some(12000));
        assert_eq!(codepage_from_name("utf-32be").map(CodePage::get), Some(12001));
    }

    #[test]
    fn test_chinese_aliases() {
        for name in ["GBK", "gb2312", "GB18030"] {
            assert_eq!(codepage_from_name(name).map(CodePage::get), Some(936), "{name}");
        }
        assert_eq!(codepage_from_name("gb18030-2000").map(CodePage::get), Some(54936));
        assert_eq!(codepage_from_name("big5").map(CodePage::get), Some(950));
        assert_eq!(codepage_from_name("us-ascii"), codepage_from_name("ASCII"));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(codepage_from_name("NOT-A-CHARSET"), None);
        assert_eq!(codepage_from_name(""), None);
        // No normalization besides case
        assert_eq!(codepage_from_name("UTF8"), None);
        assert_eq!(codepage_from_name(" UTF-8"), None);
        assert_eq!(CodePage::new(0), None);
    }

    #[test]
    fn test_entries_are_resolvable() {
        assert_eq!(entries().count(), 14);
        for (name, cp) in entries() {
            assert_eq!(codepage_from_name(name), Some(cp));
            assert_ne!(cp.get(), 0);
        }
        assert_eq!(CodePage::BIG5.to_string(), "CP950");
    }
}
