//! # mimecharset - Charset Decoding for Message Parsing
//!
//! Converts text in any named character encoding into UTF-8, on top of the
//! platform's native conversion facility. This is the piece a MIME parser
//! calls to turn `charset=`-labelled header and body bytes into text.
//!
//! ## Backends
//!
//! - **Unix**: `iconv(3)`, so every charset the system catalog knows works
//! - **Windows**: a two-hop bridge through UTF-16 over `MultiByteToWideChar`,
//!   limited to the names in [`codepage`]
//!
//! The backend is chosen at compile time. Both sit behind the same
//! [`backend::Converter`] contract and the same retry loop in [`Decoder`].
//!
//! ## Quick Start
//!
//! ```rust
//! // "你好" in GB18030
//! let utf8 = mimecharset::decode("GB18030", &[0xC4, 0xE3, 0xBA, 0xC3]).unwrap();
//! assert_eq!(utf8, "你好".as_bytes());
//!
//! let err = mimecharset::decode("NOT-A-CHARSET", b"abc").unwrap_err();
//! assert!(matches!(err, mimecharset::Error::UnsupportedEncoding { .. }));
//! ```

#![deny(missing_docs)]

pub mod backend;
pub mod charset;
pub mod codepage;
mod decoder;
#[cfg(windows)]
pub mod wide;

pub use charset::EncodingName;
pub use decoder::{
    DEFAULT_INITIAL_RATIO, DEFAULT_MAX_OUTPUT, Decoder, DecoderOptions, MIN_BUFFER,
};

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The source or target encoding has no usable backend
    #[error("unsupported character set: {name}")]
    UnsupportedEncoding {
        /// Name as given by the caller
        name: String,
    },
    /// Fatal failure during conversion; no partial output is returned
    #[error("character set conversion error ({charset}) at byte {offset}: {failure}")]
    Conversion {
        /// Source encoding name
        charset: String,
        /// Input offset at which conversion stopped
        offset: usize,
        /// What went wrong
        failure: ConversionFailure,
    },
    /// Rejected decoder configuration
    #[error("invalid decoder options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub(crate) fn unsupported(name: &EncodingName) -> Self {
        Error::UnsupportedEncoding {
            name: name.to_string(),
        }
    }
}

/// Reason a conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConversionFailure {
    /// Byte sequence that is not valid in the source encoding
    #[error("invalid byte sequence")]
    InvalidSequence,
    /// Input ends in the middle of a multi-byte character
    #[error("incomplete byte sequence at end of input")]
    IncompleteSequence,
    /// The backend reported success without consuming anything
    #[error("backend made no progress")]
    NoProgress,
    /// Decoded output would exceed the configured cap
    #[error("decoded output exceeds {limit} bytes")]
    OutputLimit {
        /// Configured cap in bytes
        limit: usize,
    },
    /// Unexpected errno from the system converter
    #[error("system error {0}")]
    System(i32),
}

/// Decode `input` from `charset` into UTF-8 with default options.
///
/// The conversion handle is opened for this call only and released before it
/// returns, whatever the outcome.
pub fn decode(charset: impl Into<EncodingName>, input: &[u8]) -> Result<Vec<u8>> {
    Decoder::default().decode(charset, input)
}

/// Decode `input` from `charset` into a `String` with default options
pub fn decode_to_string(charset: impl Into<EncodingName>, input: &[u8]) -> Result<String> {
    Decoder::default().decode_to_string(charset, input)
}
