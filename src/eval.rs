use core::any::Any;
use core::panic::Location;

use crate::call::MockCall;
use crate::error::{MockError, MockResult};
use crate::responder::{Producer, Production};
use crate::state::{MutexIsh, RegistryState};
use crate::MockFnInfo;

/// The outcome of resolving one call, before it gets recorded.
pub(crate) enum Resolved<R> {
    /// The function returns `()`, no producer was consulted.
    Unit(R),
    /// A registered producer yielded a value.
    Produced(R),
    /// No producer is registered, or it failed.
    Absent,
}

/// Resolves and records calls of one function signature.
///
/// 'm = mock instance
pub(crate) struct EvalCtx<'m, A, R> {
    info: MockFnInfo,
    state: &'m MutexIsh<RegistryState>,
    signature: core::marker::PhantomData<fn(A) -> R>,
}

impl<'m, A, R> EvalCtx<'m, A, R>
where
    A: Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(info: MockFnInfo, state: &'m MutexIsh<RegistryState>) -> Self {
        Self {
            info,
            state,
            signature: core::marker::PhantomData,
        }
    }

    /// Resolve a call, evaluating producers on the calling thread.
    ///
    /// The lock is only held while looking up the producer, never while it runs.
    pub fn resolve(&self, args: &A) -> Resolved<R> {
        if let Some(unit) = unit::<R>() {
            return Resolved::Unit(unit);
        }

        match self.producer() {
            Some(producer) => Resolved::from_option(producer.start(args).now()),
            None => Resolved::Absent,
        }
    }

    /// Resolve a call, awaiting asynchronous producers.
    ///
    /// No lock is held across the await.
    pub async fn resolve_async(&self, args: &A) -> Resolved<R> {
        if let Some(unit) = unit::<R>() {
            return Resolved::Unit(unit);
        }

        let production = match self.producer() {
            Some(producer) => producer.start(args),
            None => return Resolved::Absent,
        };

        Resolved::from_option(production.finish().await)
    }

    /// Complete a non-optional call without fallback.
    ///
    /// An absent result is a fault, and nothing is recorded.
    pub fn complete(
        &self,
        args: A,
        resolved: Resolved<R>,
        location: &'static Location<'static>,
    ) -> MockResult<R> {
        match resolved {
            Resolved::Unit(result) | Resolved::Produced(result) => Ok(self.record(args, result)),
            Resolved::Absent => Err(MockError::UnstubbedCall {
                info: self.info,
                location,
            }),
        }
    }

    /// Complete a call, using `fallback` for an absent result.
    pub fn complete_or_else(
        &self,
        args: A,
        resolved: Resolved<R>,
        fallback: impl FnOnce() -> R,
    ) -> R {
        match resolved {
            Resolved::Unit(result) | Resolved::Produced(result) => self.record(args, result),
            Resolved::Absent => self.record(args, fallback()),
        }
    }

    fn record(&self, arguments: A, result: R) -> R {
        let call = MockCall {
            arguments,
            result: Some(result.clone()),
        }
        .into_any();

        let n_calls = self.state.locked(|state| {
            let log = state.calls.entry(self.info.id).or_default();
            log.push(call);
            log.len()
        });

        tracing::trace!(mock_fn = self.info.name, id = %self.info.id, n_calls, "recorded call");

        result
    }

    fn producer(&self) -> Option<Producer<A, R>> {
        self.state.locked(|state| {
            state
                .producers
                .get(&self.info.id)
                .and_then(|producer| producer.downcast::<A, R>())
                .cloned()
        })
    }
}

impl<R> Resolved<R> {
    fn from_option(result: Option<R>) -> Self {
        match result {
            Some(result) => Self::Produced(result),
            None => Self::Absent,
        }
    }
}

/// `Some(())` when `R` is `()`.
fn unit<R: 'static>() -> Option<R> {
    let unit: Box<dyn Any> = Box::new(());
    unit.downcast::<R>().ok().map(|unit| *unit)
}
