//! Native conversion backends
//!
//! Both backends satisfy [`Converter`]: a handle opened for a
//! `(target, source)` pair that converts one chunk per call and reports how
//! much input it consumed, how much output it produced and why it stopped.
//!
//! * Unix: [`iconv::IconvConverter`], incremental, straight on top of `iconv(3)`.
//! * Windows: [`bridge::CodepageBridge`], all-or-nothing, source to UTF-16 to target.
//!
//! The platform backend is picked at compile time as [`PlatformConverter`].

pub mod bridge;
#[cfg(unix)]
pub mod iconv;

use crate::{ConversionFailure, EncodingName, Result};

#[cfg(unix)]
/// Backend used by [`crate::decode`] on this platform
pub type PlatformConverter = iconv::IconvConverter;

#[cfg(windows)]
/// Backend used by [`crate::decode`] on this platform
pub type PlatformConverter = bridge::CodepageBridge<bridge::Win32Pass>;

#[cfg(not(any(unix, windows)))]
compile_error!("mimecharset needs either iconv (unix) or the Win32 codepage API (windows)");

/// Why a single `convert` call stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All supplied input was converted
    Finished,
    /// The output region is too small; unconsumed input is left for a retry
    OutputFull,
    /// Fatal, not retried
    Failed(ConversionFailure),
}

/// Result of a single `convert` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Input bytes consumed
    pub consumed: usize,
    /// Output bytes written to the front of the output region
    pub produced: usize,
    /// Why the call returned
    pub outcome: Outcome,
}

impl Step {
    /// Everything consumed
    pub fn finished(consumed: usize, produced: usize) -> Self {
        Self {
            consumed,
            produced,
            outcome: Outcome::Finished,
        }
    }

    /// Stopped for lack of output space
    pub fn output_full(consumed: usize, produced: usize) -> Self {
        Self {
            consumed,
            produced,
            outcome: Outcome::OutputFull,
        }
    }

    /// Stopped on a fatal error
    pub fn failed(consumed: usize, produced: usize, failure: ConversionFailure) -> Self {
        Self {
            consumed,
            produced,
            outcome: Outcome::Failed(failure),
        }
    }
}

/// An open conversion context bound to one `(target, source)` pair.
///
/// Resources are released on drop, on every exit path of the caller.
pub trait Converter: Sized {
    /// Open a converter from `source` to `target`.
    ///
    /// Fails only with [`crate::Error::UnsupportedEncoding`].
    fn open(target: &EncodingName, source: &EncodingName) -> Result<Self>;

    /// Convert as much of `input` as possible into `output`
    fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Step;
}
