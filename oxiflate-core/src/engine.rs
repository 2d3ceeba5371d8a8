//! Codec engine traits.
//!
//! The streaming adapters never touch the compressed bitstream themselves.
//! They drive an engine through these traits, one step at a time, and
//! translate the returned [`StatusCode`]s at the boundary.
//!
//! An engine is bound to one direction for its whole life. It does not keep
//! references to the caller's buffers between calls: whatever input a step
//! does not consume is handed back by the caller on the next step.

use crate::header::Header;
use crate::status::StatusCode;

/// Flush mode for compression steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - buffer data for best compression.
    #[default]
    None,
    /// Sync flush - emit all pending output on a byte boundary.
    Sync,
    /// Finish - complete the stream, including any trailer.
    Finish,
}

/// Outcome of a single engine step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Bytes consumed from the input slice.
    pub consumed: usize,
    /// Bytes written to the output slice.
    pub produced: usize,
    /// Raw status code.
    pub status: StatusCode,
    /// Optional human-readable detail for error statuses.
    pub message: Option<String>,
}

impl Step {
    /// A step with the given counters and status.
    pub fn new(consumed: usize, produced: usize, status: StatusCode) -> Self {
        Self {
            consumed,
            produced,
            status,
            message: None,
        }
    }

    /// A failed step carrying a detail message.
    pub fn failed(
        consumed: usize,
        produced: usize,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            consumed,
            produced,
            status,
            message: Some(message.into()),
        }
    }

    /// Returns true if the step consumed or produced anything.
    pub fn made_progress(&self) -> bool {
        self.consumed > 0 || self.produced > 0
    }
}

/// A stateful decompression engine.
pub trait InflateEngine {
    /// Decompress from `input` into `output`.
    ///
    /// Returns `STREAM_END` when the current member's trailer has been
    /// verified. After that, [`InflateEngine::reset`] must be called before
    /// the next member can be decoded.
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step;

    /// Prepare for a new member, keeping the configured framing.
    fn reset(&mut self) -> StatusCode;

    /// Ask the engine to retain gzip headers. Fails for framings without one.
    fn enable_header_capture(&mut self) -> StatusCode;

    /// Header of the most recently parsed member, if capture is enabled and
    /// a header has been parsed.
    fn header(&self) -> Option<&Header>;

    /// Release engine resources. Further calls are not allowed.
    fn end(&mut self) -> StatusCode;
}

/// A stateful compression engine.
pub trait DeflateEngine {
    /// Compress from `input` into `output`.
    ///
    /// With [`FlushMode::Finish`] the engine returns `STREAM_END` once the
    /// complete stream, trailer included, has been written out.
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> Step;

    /// Replace the gzip header. Only valid before the first step and only for
    /// gzip framing; otherwise returns `STREAM_ERROR`.
    fn set_header(&mut self, header: &Header) -> StatusCode;

    /// Release engine resources. Further calls are not allowed.
    fn end(&mut self) -> StatusCode;
}

impl<E: InflateEngine + ?Sized> InflateEngine for Box<E> {
    fn step(&mut self, input: &[u8], output: &mut [u8]) -> Step {
        (**self).step(input, output)
    }

    fn reset(&mut self) -> StatusCode {
        (**self).reset()
    }

    fn enable_header_capture(&mut self) -> StatusCode {
        (**self).enable_header_capture()
    }

    fn header(&self) -> Option<&Header> {
        (**self).header()
    }

    fn end(&mut self) -> StatusCode {
        (**self).end()
    }
}

impl<E: DeflateEngine + ?Sized> DeflateEngine for Box<E> {
    fn step(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> Step {
        (**self).step(input, output, flush)
    }

    fn set_header(&mut self, header: &Header) -> StatusCode {
        (**self).set_header(header)
    }

    fn end(&mut self) -> StatusCode {
        (**self).end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_mode_default() {
        assert_eq!(FlushMode::default(), FlushMode::None);
    }

    #[test]
    fn test_step_progress() {
        assert!(!Step::new(0, 0, StatusCode::OK).made_progress());
        assert!(Step::new(1, 0, StatusCode::OK).made_progress());
        assert!(Step::new(0, 1, StatusCode::STREAM_END).made_progress());

        let failed = Step::failed(0, 0, StatusCode::DATA_ERROR, "bad magic");
        assert_eq!(failed.message.as_deref(), Some("bad magic"));
    }
}
