use core::panic::Location;

use crate::MockFnInfo;

/// Result of the non-panicking `try_invoke` family.
pub type MockResult<T> = Result<T, MockError>;

/// A fault in how a mock is set up.
///
/// The `invoke` family of [Mock](crate::Mock) turns these into panics,
/// the `try_invoke` family returns them.
#[derive(Clone, Debug, thiserror::Error)]
pub enum MockError {
    /// A function with a non-optional result was called without a registered result
    /// (or its registered producer failed), and the call had no fallback.
    #[error("{info} called at {location}: No result registered. Register a result with `register_result` before calling this function.")]
    UnstubbedCall {
        /// The function that was called.
        info: MockFnInfo,
        /// Where the mocked function was invoked.
        location: &'static Location<'static>,
    },
}

impl MockError {
    /// The function the fault is about.
    pub fn info(&self) -> MockFnInfo {
        match self {
            Self::UnstubbedCall { info, .. } => *info,
        }
    }
}
