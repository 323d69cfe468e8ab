//!
//! `callrec` records the calls made to hand-written test doubles, and returns results registered up front.
//!
//! A mock is an ordinary struct implementing the trait under test. It owns a [Mock] registry,
//! and one function reference ([MockRef] or [AsyncMockRef]) per mocked method.
//! Each method body routes its arguments through one of the `invoke` methods:
//!
//! ```rust
//! use callrec::*;
//!
//! trait Store {
//!     fn get(&self, key: &str) -> Option<String>;
//!     fn set(&self, key: &str, value: String);
//!     fn len(&self) -> usize;
//! }
//!
//! #[derive(Default)]
//! struct MockStore {
//!     mock: Mock,
//! }
//!
//! // `&str` parameters are recorded as `String`, which `untyped` allows
//! static GET: LazyMockRef<String, Option<String>> =
//!     LazyMockRef::new(|| MockRef::untyped(<MockStore as Store>::get));
//! static SET: LazyMockRef<(String, String), ()> =
//!     LazyMockRef::new(|| MockRef::untyped(<MockStore as Store>::set));
//! static LEN: LazyMockRef<(), usize> = LazyMockRef::new(|| MockRef::new(<MockStore as Store>::len));
//!
//! impl Mockable for MockStore {
//!     fn mock(&self) -> &Mock {
//!         &self.mock
//!     }
//! }
//!
//! impl Store for MockStore {
//!     fn get(&self, key: &str) -> Option<String> {
//!         // no result registered: returns `None`
//!         self.invoke_optional(&GET, key.to_string())
//!     }
//!
//!     fn set(&self, key: &str, value: String) {
//!         // returns `()`: never needs a registered result
//!         self.invoke(&SET, (key.to_string(), value))
//!     }
//!
//!     fn len(&self) -> usize {
//!         // no result registered: panics
//!         self.invoke(&LEN, ())
//!     }
//! }
//!
//! let store = MockStore::default();
//! store.register_result(&*LEN, |_| 42);
//!
//! store.set("a", "1".to_string());
//! assert_eq!(None, store.get("a"));
//! assert_eq!(42, store.len());
//!
//! assert!(store.has_been_called_times(&*SET, 1));
//! assert_eq!(("a".to_string(), "1".to_string()), store.calls(&*SET)[0].arguments);
//! ```
//!
//! # Identity
//! Calls and results are keyed by the identity of the function reference, which is minted anew
//! every time a reference is constructed. Two references never collide, even when created from the
//! same function. So keep exactly one reference per mocked function, for as long as the mock lives.
//!
//! # Signatures
//! [MockRef::new] checks that the captured function has arguments `A` and result `R`.
//! The receiver of a method is dropped and the remaining parameters are tupled, see [MockableFn].
//! Methods with borrowed parameters are recorded with owned arguments, and use [MockRef::untyped].
//!
//! # Unstubbed calls
//! Calling a function with a non-optional result, without a registered result and without a fallback,
//! is a mistake in the test setup. [Mock::invoke] panics before recording anything.
//! Functions returning `()` and functions with an `Option` result never need a registered result.
//!
//! # Threads
//! A [Mock] may be called from many threads at the same time.
//! Asynchronous producers are awaited without holding any lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod call;
mod error;
mod eval;
mod mock;
mod mock_ref;
mod responder;
pub mod signature;
mod state;

use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

pub use call::MockCall;
pub use error::{MockError, MockResult};
pub use mock::Mock;
pub use mock_ref::{
    AsyncMockRef, FnId, LazyAsyncMockRef, LazyMockRef, MockFn, MockFnInfo, MockRef,
};
pub use signature::{MockableAsyncFn, MockableFn};

/// An owned, `Send` future. Used for asynchronous producers and the async methods of [Mockable].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that has a call registry.
///
/// Implement [Mockable::mock] to get all registry operations as methods on the mock itself.
/// [Mock] implements `Mockable` as well, for mocks that don't need any other state.
pub trait Mockable {
    /// The registry of this mock.
    fn mock(&self) -> &Mock;

    /// See [Mock::register_result].
    fn register_result<F, P>(&self, mock_fn: &F, producer: P)
    where
        F: MockFn + ?Sized,
        P: Fn(&F::Args) -> F::Output + Send + Sync + 'static,
    {
        self.mock().register_result(mock_fn, producer)
    }

    /// See [Mock::register_fallible_result].
    fn register_fallible_result<F, P, E>(&self, mock_fn: &F, producer: P)
    where
        F: MockFn + ?Sized,
        P: Fn(&F::Args) -> Result<F::Output, E> + Send + Sync + 'static,
        E: core::fmt::Display,
    {
        self.mock().register_fallible_result(mock_fn, producer)
    }

    /// See [Mock::register_async_result].
    fn register_async_result<A, R, P, Fut>(&self, mock_fn: &AsyncMockRef<A, R>, producer: P)
    where
        A: Send + Sync + 'static,
        R: Send + Sync + 'static,
        P: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        self.mock().register_async_result(mock_fn, producer)
    }

    /// See [Mock::has_result].
    fn has_result<F: MockFn + ?Sized>(&self, mock_fn: &F) -> bool {
        self.mock().has_result(mock_fn)
    }

    /// See [Mock::remove_result].
    fn remove_result<F: MockFn + ?Sized>(&self, mock_fn: &F) {
        self.mock().remove_result(mock_fn)
    }

    /// See [Mock::invoke].
    #[track_caller]
    fn invoke<A, R>(&self, mock_fn: &MockRef<A, R>, args: A) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.mock().invoke(mock_fn, args)
    }

    /// See [Mock::try_invoke].
    #[track_caller]
    fn try_invoke<A, R>(&self, mock_fn: &MockRef<A, R>, args: A) -> MockResult<R>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.mock().try_invoke(mock_fn, args)
    }

    /// See [Mock::invoke_or].
    fn invoke_or<A, R>(&self, mock_fn: &MockRef<A, R>, args: A, fallback: R) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.mock().invoke_or(mock_fn, args, fallback)
    }

    /// See [Mock::invoke_or_else].
    fn invoke_or_else<A, R>(
        &self,
        mock_fn: &MockRef<A, R>,
        args: A,
        fallback: impl FnOnce() -> R,
    ) -> R
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        self.mock().invoke_or_else(mock_fn, args, fallback)
    }

    /// See [Mock::invoke_optional].
    fn invoke_optional<A, T>(&self, mock_fn: &MockRef<A, Option<T>>, args: A) -> Option<T>
    where
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        self.mock().invoke_optional(mock_fn, args)
    }

    /// See [Mock::invoke_async].
    #[track_caller]
    fn invoke_async<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
    ) -> BoxFuture<'a, R>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        Box::pin(self.mock().invoke_async(mock_fn, args))
    }

    /// See [Mock::try_invoke_async].
    #[track_caller]
    fn try_invoke_async<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
    ) -> BoxFuture<'a, MockResult<R>>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        Box::pin(self.mock().try_invoke_async(mock_fn, args))
    }

    /// See [Mock::invoke_async_or].
    fn invoke_async_or<'a, A, R>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
        fallback: R,
    ) -> BoxFuture<'a, R>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
    {
        Box::pin(self.mock().invoke_async_or(mock_fn, args, fallback))
    }

    /// See [Mock::invoke_async_or_else].
    fn invoke_async_or_else<'a, A, R, D>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, R>,
        args: A,
        fallback: D,
    ) -> BoxFuture<'a, R>
    where
        A: Send + Sync + 'static,
        R: Clone + Send + Sync + 'static,
        D: FnOnce() -> R + Send + 'a,
    {
        Box::pin(self.mock().invoke_async_or_else(mock_fn, args, fallback))
    }

    /// See [Mock::invoke_async_optional].
    fn invoke_async_optional<'a, A, T>(
        &'a self,
        mock_fn: &'a AsyncMockRef<A, Option<T>>,
        args: A,
    ) -> BoxFuture<'a, Option<T>>
    where
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        Box::pin(self.mock().invoke_async_optional(mock_fn, args))
    }

    /// See [Mock::calls].
    fn calls<F: MockFn + ?Sized>(&self, mock_fn: &F) -> Vec<Arc<MockCall<F::Args, F::Output>>> {
        self.mock().calls(mock_fn)
    }

    /// See [Mock::call_count].
    fn call_count<F: MockFn + ?Sized>(&self, mock_fn: &F) -> usize {
        self.mock().call_count(mock_fn)
    }

    /// See [Mock::has_been_called].
    fn has_been_called<F: MockFn + ?Sized>(&self, mock_fn: &F) -> bool {
        self.mock().has_been_called(mock_fn)
    }

    /// See [Mock::has_been_called_times].
    fn has_been_called_times<F: MockFn + ?Sized>(&self, mock_fn: &F, n_times: usize) -> bool {
        self.mock().has_been_called_times(mock_fn, n_times)
    }

    /// See [Mock::reset].
    fn reset(&self) {
        self.mock().reset()
    }

    /// See [Mock::reset_calls].
    fn reset_calls<F: MockFn + ?Sized>(&self, mock_fn: &F) {
        self.mock().reset_calls(mock_fn)
    }
}

impl Mockable for Mock {
    fn mock(&self) -> &Mock {
        self
    }
}
