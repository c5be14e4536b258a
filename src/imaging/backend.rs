//! Filter backend trait and shared error type.
//!
//! The [`FilterBackend`] trait is the single seam between orchestration code
//! (scheduler, cache, batch coordinator) and the pixel algorithms. It takes a
//! borrowed source and returns a freshly allocated buffer; the source is never
//! touched, so one buffer can feed any number of concurrent calls.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in the
//! counting `MockBackend` below.

use super::params::FilterSpec;
use crate::buffer::{BufferError, PixelBuffer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid parameter for {filter}: {reason}")]
    InvalidParameter {
        filter: &'static str,
        reason: String,
    },
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

impl FilterError {
    pub fn invalid(filter: &'static str, reason: impl Into<String>) -> Self {
        FilterError::InvalidParameter {
            filter,
            reason: reason.into(),
        }
    }
}

impl From<BufferError> for FilterError {
    fn from(e: BufferError) -> Self {
        FilterError::ProcessingFailed(e.to_string())
    }
}

/// Applies a [`FilterSpec`] to a whole buffer.
///
/// Implementations must be pure: the same input and spec always produce the
/// same output. `Sync` is required because the scheduler calls `apply` from
/// rayon workers.
pub trait FilterBackend: Sync {
    fn apply(&self, source: &PixelBuffer, spec: &FilterSpec) -> Result<PixelBuffer, FilterError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records calls and returns a copy of the input.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// 1-based call number that returns `ProcessingFailed`.
        pub fail_on: Option<usize>,
        /// 1-based call number that panics.
        pub panic_on: Option<usize>,
        hook: Option<Box<dyn Fn(usize) + Send + Sync>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedOp {
        pub filter: FilterSpec,
        pub width: u32,
        pub height: u32,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(call: usize) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::default()
            }
        }

        pub fn panicking_on(call: usize) -> Self {
            Self {
                panic_on: Some(call),
                ..Self::default()
            }
        }

        /// Run `hook(call_number)` at the start of every call.
        pub fn with_hook(hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
            Self {
                hook: Some(Box::new(hook)),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.operations.lock().unwrap().len()
        }
    }

    impl FilterBackend for MockBackend {
        fn apply(
            &self,
            source: &PixelBuffer,
            spec: &FilterSpec,
        ) -> Result<PixelBuffer, FilterError> {
            let call = {
                let mut ops = self.operations.lock().unwrap();
                ops.push(RecordedOp {
                    filter: *spec,
                    width: source.width(),
                    height: source.height(),
                });
                ops.len()
            };
            if let Some(hook) = &self.hook {
                hook(call);
            }
            if self.panic_on == Some(call) {
                panic!("mock panic on call {call}");
            }
            if self.fail_on == Some(call) {
                return Err(FilterError::ProcessingFailed(format!(
                    "mock failure on call {call}"
                )));
            }
            Ok(source.clone())
        }
    }

    #[test]
    fn mock_records_calls() {
        let backend = MockBackend::new();
        let buf =
            PixelBuffer::filled(4, 3, crate::buffer::Channels::Rgb, &[1, 2, 3]).unwrap();

        let out = backend.apply(&buf, &FilterSpec::Sepia).unwrap();
        assert_eq!(out, buf);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0],
            RecordedOp {
                filter: FilterSpec::Sepia,
                width: 4,
                height: 3
            }
        );
    }

    #[test]
    fn mock_fails_on_requested_call() {
        let backend = MockBackend::failing_on(2);
        let buf =
            PixelBuffer::filled(1, 1, crate::buffer::Channels::Rgb, &[0, 0, 0]).unwrap();

        assert!(backend.apply(&buf, &FilterSpec::Negative).is_ok());
        assert!(matches!(
            backend.apply(&buf, &FilterSpec::Negative),
            Err(FilterError::ProcessingFailed(_))
        ));
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn invalid_helper_builds_parameter_error() {
        let err = FilterError::invalid("blur", "radius must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter for blur: radius must be at least 1"
        );
    }
}
