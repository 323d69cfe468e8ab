use core::fmt;
use core::fmt::Display;
use core::future::Future;
use core::panic::Location;
use std::sync::Arc;

use crate::call::{downcast_calls, MockCall};
use crate::error::{MockError, MockResult};
use crate::eval::EvalCtx;
use crate::responder::Producer;
use crate::state::{MutexIsh, RegistryState};
use crate::{AsyncMockRef, MockFn, MockRef};

/// The call registry of one mock instance.
///
/// A `Mock` records every call routed through it, and resolves the result of each call
/// from a producer registered up front.
///
/// It is safe to use one `Mock` from many threads at the same time.
/// Every operation is atomic, and producers run without holding any lock,
/// so they may call back into the same mock.
///
/// Mocks either *are* a `Mock` (it implements [Mockable](crate::Mockable) itself),
/// or *hold* one and implement [Mockable](crate::Mockable) by returning it.
#[derive(Default)]
pub struct Mock {
    state: MutexIsh<RegistryState>,
}

impl Mock {
    /// Create an empty registry, with no calls and no results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the producer of results for `mock_fn`, replacing any previous producer.
    ///
    /// The producer receives the arguments of each call.
    pub fn register_result<F, P>(&self, mock_fn: &F, producer: P)
    where
        F: MockFn + ?Sized,
        P: Fn(&F::Args) -> F::Output + Send + Sync + 'static,
    {
        self.store_producer(mock_fn, Producer::from_fn(producer));
    }

    /// Register a producer that may fail.
    ///
    /// A failure counts as if no result was registered:
    /// [Mock::invoke] will panic, [Mock::invoke_or] returns its fallback and [Mock::invoke_optional] returns `None`.
    pub fn register_fallible_result<F, P, E>(&self, mock_fn: &F, producer: P)
    where
        F: MockFn + ?Sized,
        P: Fn(&F::Args) -> Result<F::Output, E> + Send + Sync + 'static,
        E: Display,
    {
        self.store_producer(
            mock_fn,
            Producer::from_fallible_fn(mock_fn.info(), producer),
        );
    }

    /// Register an asynchronous producer for `mock_fn`, replacing any previous producer.
    ///
    /// The returned future can't borrow the arguments, clone what it needs before the `async` block.
    pub fn register_async_result<A, R, P, Fut>(&self, mock_fn: &AsyncMockRef<A, R>, producer: P)
    where
        A: Send + Sync + 'static,
        R: Send + Sync + 'static,
        P: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.store_producer(mock_fn, Producer::from_async_fn(producer));
    }

    /// Whether a producer is registered for `mock_fn`.
    pub fn has_result<F: MockFn + ?Sized>(&self, mock_fn: &F) -> bool {
        let id = mock_fn.id();
        self.state.locked(|state| state.producers.contains_key(&id))
    }

    /// Unregister the producer for `mock_fn`.
    pub fn remove_result<F: MockFn + ?Sized>(&self, mock_fn: &F) {
        let id = mock_fn.id();
        self.state.locked(|state| state.producers.remove(&id));
    }

    /// Invoke a function with a non-optional result, returning the result of its registered producer.
    ///
    /// A function returning `()` needs no registered result.
    ///
    /// # Panics
    /// When no result is registered, or the registered producer failed.
    /// The call is not recorded in that case.
    #[track_caller]
    pub fn invoke<A, R>(&self, mock_fn: &MockRef<A, R>, args: A) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        match self.try_invoke(mock_fn, args) {
            Ok(result) => result,
            Err(error) => self.induce_panic(error),
        }
    }

    /// Like [Mock::invoke], but returns the fault instead of panicking.
    #[track_caller]
    pub fn try_invoke<A, R>(&self, mock_fn: &MockRef<A, R>, args: A) -> MockResult<R>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        let location = Location::caller();
        let ctx = self.eval_ctx(mock_fn);
        let resolved = ctx.resolve(&args);
        ctx.complete(args, resolved, location)
    }

    /// Invoke a function with a non-optional result, returning `fallback` when no result is registered.
    pub fn invoke_or<A, R>(&self, mock_fn: &MockRef<A, R>, args: A, fallback: R) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.invoke_or_else(mock_fn, args, || fallback)
    }

    /// Invoke a function with a non-optional result, computing a fallback when no result is registered.
    pub fn invoke_or_else<A, R>(
        &self,
        mock_fn: &MockRef<A, R>,
        args: A,
        fallback: impl FnOnce() -> R,
    ) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        let ctx = self.eval_ctx(mock_fn);
        let resolved = ctx.resolve(&args);
        ctx.complete_or_else(args, resolved, fallback)
    }

    /// Invoke a function with an optional result. Without a registered result, it returns `None`.
    pub fn invoke_optional<A, T>(&self, mock_fn: &MockRef<A, Option<T>>, args: A) -> Option<T>
    where
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.invoke_or_else(mock_fn, args, || None)
    }

    /// Invoke an async function with a non-optional result.
    ///
    /// # Panics
    /// When no result is registered, or the registered producer failed.
    #[track_caller]
    pub fn invoke_async<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
    ) -> impl Future<Output = R> + Send + 'a
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        let result = self.try_invoke_async(mock_fn, args);
        async move {
            match result.await {
                Ok(result) => result,
                Err(error) => self.induce_panic(error),
            }
        }
    }

    /// Like [Mock::invoke_async], but returns the fault instead of panicking.
    #[track_caller]
    pub fn try_invoke_async<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
    ) -> impl Future<Output = MockResult<R>> + Send + 'a
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        let location = Location::caller();
        async move {
            let ctx = self.eval_ctx(mock_fn);
            let resolved = ctx.resolve_async(&args).await;
            ctx.complete(args, resolved, location)
        }
    }

    /// Invoke an async function with a non-optional result, returning `fallback` when no result is registered.
    pub fn invoke_async_or<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
        fallback: R,
    ) -> impl Future<Output = R> + Send + 'a
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.invoke_async_or_else(mock_fn, args, move || fallback)
    }

    /// Invoke an async function with a non-optional result, computing a fallback when no result is registered.
    pub fn invoke_async_or_else<'a, A, R, D>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
        fallback: D,
    ) -> impl Future<Output = R> + Send + 'a
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
        D: FnOnce() -> R + Send + 'a,
    {
        async move {
            let ctx = self.eval_ctx(mock_fn);
            let resolved = ctx.resolve_async(&args).await;
            ctx.complete_or_else(args, resolved, fallback)
        }
    }

    /// Invoke an async function with an optional result. Without a registered result, it returns `None`.
    pub fn invoke_async_optional<'a, A, T>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, Option<T>>,
        args: A,
    ) -> impl Future<Output = Option<T>> + Send + 'a
    where
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.invoke_async_or_else(mock_fn, args, || None)
    }

    /// All recorded calls of `mock_fn`, in call order.
    pub fn calls<F: MockFn + ?Sized>(&self, mock_fn: &F) -> Vec<Arc<MockCall<F::Args, F::Output>>> {
        let id = mock_fn.id();
        self.state.locked(|state| {
            state
                .calls
                .get(&id)
                .map(|log| downcast_calls(log))
                .unwrap_or_default()
        })
    }

    /// The number of recorded calls of `mock_fn`.
    pub fn call_count<F: MockFn + ?Sized>(&self, mock_fn: &F) -> usize {
        self.calls(mock_fn).len()
    }

    /// Whether `mock_fn` has been called at least once.
    pub fn has_been_called<F: MockFn + ?Sized>(&self, mock_fn: &F) -> bool {
        !self.calls(mock_fn).is_empty()
    }

    /// Whether `mock_fn` has been called exactly `n_times`.
    pub fn has_been_called_times<F: MockFn + ?Sized>(&self, mock_fn: &F, n_times: usize) -> bool {
        self.calls(mock_fn).len() == n_times
    }

    /// Forget all recorded calls. Registered results are kept.
    pub fn reset(&self) {
        let n_fns = self.state.locked(|state| {
            let n_fns = state.calls.len();
            state.calls.clear();
            n_fns
        });

        tracing::debug!(n_fns, "reset all recorded calls");
    }

    /// Forget the recorded calls of `mock_fn`. Its registered result is kept.
    pub fn reset_calls<F: MockFn + ?Sized>(&self, mock_fn: &F) {
        let info = mock_fn.info();
        self.state.locked(|state| state.calls.remove(&info.id));

        tracing::debug!(mock_fn = info.name, id = %info.id, "reset recorded calls");
    }

    fn store_producer<F, A, R>(&self, mock_fn: &F, producer: Producer<A, R>)
    where
        F: MockFn + ?Sized,
        A: 'static,
        R: 'static,
    {
        let info = mock_fn.info();
        let producer = producer.into_dyn_producer();
        self.state.locked(|state| state.producers.insert(info.id, producer));

        tracing::trace!(mock_fn = info.name, id = %info.id, "registered result");
    }

    fn eval_ctx<F>(&self, mock_fn: &F) -> EvalCtx<'_, F::Args, F::Output>
    where
        F: MockFn + ?Sized,
        F::Output: Clone,
    {
        EvalCtx::new(mock_fn.info(), &self.state)
    }

    #[track_caller]
    pub(crate) fn induce_panic(&self, error: MockError) -> ! {
        let info = error.info();
        tracing::error!(mock_fn = info.name, id = %info.id, %error, "mock fault");

        panic!("{error}");
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n_recorded_fns, n_calls, n_results) = self.state.locked(|state| {
            (
                state.calls.len(),
                state.calls.values().map(Vec::len).sum::<usize>(),
                state.producers.len(),
            )
        });

        f.debug_struct("Mock")
            .field("recorded_fns", &n_recorded_fns)
            .field("calls", &n_calls)
            .field("results", &n_results)
            .finish()
    }
}
