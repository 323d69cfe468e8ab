use core::any::Any;
use std::sync::Arc;

/// One recorded invocation of a mocked function.
///
/// Calls are handed out as `Arc<MockCall<A, R>>`, and are never mutated after being recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCall<A, R> {
    /// The arguments the function was called with.
    pub arguments: A,

    /// The result that was returned to the caller.
    ///
    /// Functions returning `()` record `Some(())`.
    /// Functions with an optional result that produced nothing record `Some(None)`.
    pub result: Option<R>,
}

/// Type-erased entry in a call log.
pub(crate) type AnyCall = Arc<dyn Any + Send + Sync>;

impl<A, R> MockCall<A, R>
where
    A: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    pub(crate) fn into_any(self) -> AnyCall {
        Arc::new(self)
    }
}

/// Recover the typed calls of a log.
///
/// Entries of another type are skipped. They can't exist for a log keyed by a [MockFn](crate::MockFn)
/// of that very type, so this never loses calls in practice.
pub(crate) fn downcast_calls<A, R>(log: &[AnyCall]) -> Vec<Arc<MockCall<A, R>>>
where
    A: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    log.iter()
        .filter_map(|call| call.clone().downcast::<MockCall<A, R>>().ok())
        .collect()
}
