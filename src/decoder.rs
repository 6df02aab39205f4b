//! Streaming decoder: drives a [`Converter`] until all input is consumed
//!
//! The working buffer starts at a multiple of the input length, which makes
//! the common case a single pass. Whenever the backend runs out of output
//! space the buffer doubles, up to [`DecoderOptions::max_output`], so a
//! backend that makes no progress on a small buffer (the codepage bridge)
//! still terminates.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backend::{Converter, Outcome, PlatformConverter};
use crate::{ConversionFailure, EncodingName, Error, Result};

/// Smallest working buffer ever allocated
pub const MIN_BUFFER: usize = 64;

/// Default ratio between working buffer and input length
pub const DEFAULT_INITIAL_RATIO: usize = 2;

/// Default cap on decoded output (256 MiB)
pub const DEFAULT_MAX_OUTPUT: usize = 256 * 1024 * 1024;

/// Tuning for [`Decoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderOptions {
    /// Initial working buffer size as a multiple of the input length
    pub initial_ratio: usize,
    /// Upper bound on decoded output, in bytes
    pub max_output: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            initial_ratio: DEFAULT_INITIAL_RATIO,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

impl DecoderOptions {
    fn validate(&self) -> Result<()> {
        if self.initial_ratio == 0 {
            return Err(Error::InvalidOptions(
                "initial_ratio must be at least 1".to_string(),
            ));
        }
        if self.max_output == 0 {
            return Err(Error::InvalidOptions(
                "max_output must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn initial_buffer(&self, input_len: usize) -> usize {
        input_len
            .saturating_mul(self.initial_ratio)
            .max(MIN_BUFFER)
            .min(self.max_output)
    }
}

/// Decoder from any charset the platform backend knows into UTF-8
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    /// Create a decoder, rejecting nonsensical options
    pub fn new(options: DecoderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Options in effect
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode `input` from `charset` into UTF-8 using the platform backend
    pub fn decode(&self, charset: impl Into<EncodingName>, input: &[u8]) -> Result<Vec<u8>> {
        let charset = charset.into();
        let converter = PlatformConverter::open(&EncodingName::UTF8, &charset)?;
        self.decode_with(converter, &charset, input)
    }

    /// Like [`Decoder::decode`], returning a `String`
    pub fn decode_to_string(
        &self,
        charset: impl Into<EncodingName>,
        input: &[u8],
    ) -> Result<String> {
        let charset = charset.into();
        let bytes = self.decode(&charset, input)?;
        String::from_utf8(bytes).map_err(|e| Error::Conversion {
            charset: charset.to_string(),
            offset: e.utf8_error().valid_up_to(),
            failure: ConversionFailure::InvalidSequence,
        })
    }

    /// Run the conversion loop on an already opened converter.
    ///
    /// `charset` is only used for error reporting. The converter is dropped,
    /// and its resources released, before this returns.
    pub fn decode_with<C: Converter>(
        &self,
        mut converter: C,
        charset: &EncodingName,
        input: &[u8],
    ) -> Result<Vec<u8>> {
        let limit = self.options.max_output;
        debug!(%charset, input_len = input.len(), "decoding");

        let mut decoded = Vec::with_capacity(input.len());
        let mut buf = vec![0u8; self.options.initial_buffer(input.len())];
        let mut rest = input;

        let fail = |rest: &[u8], failure: ConversionFailure| -> Result<Vec<u8>> {
            let offset = input.len() - rest.len();
            debug!(%charset, offset, ?failure, "conversion failed");
            Err(Error::Conversion {
                charset: charset.to_string(),
                offset,
                failure,
            })
        };

        while !rest.is_empty() {
            let step = converter.convert(rest, &mut buf);
            let offset = input.len() - rest.len();
            decoded.extend_from_slice(&buf[..step.produced]);
            rest = &rest[step.consumed..];

            match step.outcome {
                Outcome::Finished if step.consumed == 0 => {
                    return fail(rest, ConversionFailure::NoProgress);
                }
                Outcome::Finished => {}
                Outcome::OutputFull => {
                    if buf.len() >= limit {
                        if step.produced == 0 {
                            return fail(rest, ConversionFailure::OutputLimit { limit });
                        }
                    } else {
                        let grown = buf.len().saturating_mul(2).min(limit);
                        trace!(%charset, offset, from = buf.len(), to = grown, "growing buffer");
                        buf.resize(grown, 0);
                    }
                }
                Outcome::Failed(failure) => return fail(rest, failure),
            }

            if decoded.len() > limit {
                return fail(rest, ConversionFailure::OutputLimit { limit });
            }
        }

        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Step;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Bridge-style converter: all or nothing, every input byte expands to
    /// `factor` output bytes
    struct Expanding {
        factor: usize,
        calls: Rc<Cell<usize>>,
    }

    impl Expanding {
        fn new(factor: usize) -> Self {
            Self {
                factor,
                calls: Rc::default(),
            }
        }
    }

    impl Converter for Expanding {
        fn open(_: &EncodingName, _: &EncodingName) -> Result<Self> {
            Ok(Self::new(1))
        }

        fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Step {
            self.calls.set(self.calls.get() + 1);
            let needed = input.len() * self.factor;
            if needed > output.len() {
                return Step::output_full(0, 0);
            }
            for (i, &b) in input.iter().enumerate() {
                output[i * self.factor..(i + 1) * self.factor].fill(b);
            }
            Step::finished(input.len(), needed)
        }
    }

    /// iconv-style converter: each input byte becomes three output bytes,
    /// converts as many whole units as fit
    struct Tripling;

    impl Converter for Tripling {
        fn open(_: &EncodingName, _: &EncodingName) -> Result<Self> {
            Ok(Self)
        }

        fn convert(&mut self, input: &[u8], output: &mut [u8]) -> Step {
            let n = input.len().min(output.len() / 3);
            for (i, &b) in input[..n].iter().enumerate() {
                output[i * 3..i * 3 + 3].fill(b);
            }
            if n < input.len() {
                Step::output_full(n, n * 3)
            } else {
                Step::finished(n, n * 3)
            }
        }
    }

    struct Scripted(Vec<Step>);

    impl Converter for Scripted {
        fn open(_: &EncodingName, _: &EncodingName) -> Result<Self> {
            Ok(Self(Vec::new()))
        }

        fn convert(&mut self, _: &[u8], output: &mut [u8]) -> Step {
            let step = self.0.remove(0);
            output[..step.produced].fill(b'x');
            step
        }
    }

    fn charset() -> EncodingName {
        EncodingName::from("TEST")
    }

    #[test]
    fn test_buffer_grows_until_all_or_nothing_backend_fits() {
        let decoder = Decoder::default();
        let input = vec![b'a'; 1000];
        let out = decoder
            .decode_with(Expanding::new(50), &charset(), &input)
            .unwrap();
        assert_eq!(out.len(), 50_000);
        assert!(out.iter().all(|&b| b == b'a'));
    }

    #[test]
    fn test_growth_is_geometric() {
        let decoder = Decoder::default();
        let conv = Expanding::new(64);
        let calls = Rc::clone(&conv.calls);
        // buffer 2000 -> 4000 -> ... -> 64000
        let out = decoder.decode_with(conv, &charset(), &[b'z'; 1000]).unwrap();
        assert_eq!(out.len(), 64_000);
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn test_incremental_progress_is_concatenated() {
        let decoder = Decoder::default();
        let input: Vec<u8> = (0..=255).collect();
        // 170 units fit the initial 512 byte buffer, the rest after one growth
        let out = decoder.decode_with(Tripling, &charset(), &input).unwrap();
        let expected: Vec<u8> = input.iter().flat_map(|&b| [b; 3]).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_output_limit_stops_growth() {
        let decoder = Decoder::new(DecoderOptions {
            initial_ratio: 1,
            max_output: 4096,
        })
        .unwrap();
        let err = decoder
            .decode_with(Expanding::new(100), &charset(), &[b'q'; 100])
            .unwrap_err();
        assert_eq!(
            err,
            Error::Conversion {
                charset: "TEST".to_string(),
                offset: 0,
                failure: ConversionFailure::OutputLimit { limit: 4096 },
            }
        );
    }

    #[test]
    fn test_output_limit_below_expansion() {
        let decoder = Decoder::new(DecoderOptions {
            initial_ratio: 1,
            max_output: 100,
        })
        .unwrap();
        let err = decoder
            .decode_with(Expanding::new(2), &charset(), &[b'q'; 80])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion {
                failure: ConversionFailure::OutputLimit { limit: 100 },
                ..
            }
        ));
    }

    #[test]
    fn test_fatal_error_reports_offset_and_discards_output() {
        let decoder = Decoder::default();
        let conv = Scripted(vec![
            Step::output_full(3, 5),
            Step::failed(2, 1, ConversionFailure::InvalidSequence),
        ]);
        let err = decoder.decode_with(conv, &charset(), b"0123456789").unwrap_err();
        assert_eq!(
            err,
            Error::Conversion {
                charset: "TEST".to_string(),
                offset: 5,
                failure: ConversionFailure::InvalidSequence,
            }
        );
    }

    #[test]
    fn test_no_progress_is_fatal() {
        let decoder = Decoder::default();
        let conv = Scripted(vec![Step::finished(0, 0)]);
        let err = decoder.decode_with(conv, &charset(), b"abc").unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion {
                offset: 0,
                failure: ConversionFailure::NoProgress,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input_skips_backend() {
        let decoder = Decoder::default();
        let out = decoder.decode_with(Scripted(Vec::new()), &charset(), b"").unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_invalid_options() {
        assert!(matches!(
            Decoder::new(DecoderOptions {
                initial_ratio: 0,
                ..Default::default()
            }),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            Decoder::new(DecoderOptions {
                max_output: 0,
                ..Default::default()
            }),
            Err(Error::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_options_from_json() {
        let options: DecoderOptions = serde_json::from_str(r#"{"max_output": 1024}"#).unwrap();
        assert_eq!(options.initial_ratio, DEFAULT_INITIAL_RATIO);
        assert_eq!(options.max_output, 1024);
        assert!(serde_json::from_str::<DecoderOptions>(r#"{"ratio": 3}"#).is_err());
    }

    #[test]
    fn test_initial_buffer_bounds() {
        let options = DecoderOptions::default();
        assert_eq!(options.initial_buffer(0), MIN_BUFFER);
        assert_eq!(options.initial_buffer(1000), 2000);
        let capped = DecoderOptions {
            initial_ratio: 4,
            max_output: 100,
        };
        assert_eq!(capped.initial_buffer(1000), 100);
    }
}
