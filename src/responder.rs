//! Producers compute the result of a mocked call from its arguments.
//!
//! A producer yielding `None` has failed. The registry doesn't distinguish
//! a failed producer from an absent one.

use core::any::Any;
use core::fmt::Display;
use core::future::Future;
use std::sync::Arc;

use crate::{BoxFuture, MockFnInfo};

pub(crate) type AnyBox = Box<dyn Any + Send + Sync + 'static>;

type SyncProduceFn<A, R> = dyn Fn(&A) -> Option<R> + Send + Sync;
type AsyncProduceFn<A, R> = dyn Fn(&A) -> BoxFuture<'static, Option<R>> + Send + Sync;

/// Type-erased producer which can be stored directly in the registry.
pub(crate) struct DynProducer(AnyBox);

impl DynProducer {
    /// Downcast to the producer of a specific signature.
    ///
    /// A mismatch means "no producer", it is never an error.
    pub fn downcast<A: 'static, R: 'static>(&self) -> Option<&Producer<A, R>> {
        self.0.downcast_ref()
    }
}

/// A producer for a function with arguments `A` and result `R`.
pub(crate) enum Producer<A, R> {
    Sync(Arc<SyncProduceFn<A, R>>),
    Async(Arc<AsyncProduceFn<A, R>>),
}

impl<A, R> Clone for Producer<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(f.clone()),
            Self::Async(f) => Self::Async(f.clone()),
        }
    }
}

impl<A: 'static, R: 'static> Producer<A, R> {
    pub fn from_fn<P>(producer: P) -> Self
    where
        P: Fn(&A) -> R + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(move |args: &A| Some(producer(args))))
    }

    pub fn from_fallible_fn<P, E>(info: MockFnInfo, producer: P) -> Self
    where
        P: Fn(&A) -> Result<R, E> + Send + Sync + 'static,
        E: Display,
    {
        Self::Sync(Arc::new(move |args: &A| match producer(args) {
            Ok(result) => Some(result),
            Err(error) => {
                tracing::debug!(
                    mock_fn = info.name,
                    id = %info.id,
                    %error,
                    "registered producer failed, treating the result as absent"
                );
                None
            }
        }))
    }

    pub fn from_async_fn<P, Fut>(producer: P) -> Self
    where
        P: Fn(&A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::Async(Arc::new(move |args: &A| {
            let future = producer(args);
            let boxed: BoxFuture<'static, Option<R>> = Box::pin(async move { Some(future.await) });
            boxed
        }))
    }

    pub fn into_dyn_producer(self) -> DynProducer {
        DynProducer(Box::new(self))
    }

    /// Start producing a result.
    ///
    /// The arguments are only borrowed while starting, a pending production owns all it needs.
    pub fn start(&self, args: &A) -> Production<R> {
        match self {
            Self::Sync(produce) => Production::Ready(produce(args)),
            Self::Async(produce) => Production::Pending(produce(args)),
        }
    }
}

/// A started producer.
pub(crate) enum Production<R> {
    Ready(Option<R>),
    Pending(BoxFuture<'static, Option<R>>),
}

impl<R> Production<R> {
    /// The result, for callers that can't wait.
    ///
    /// A pending production is dropped and counts as failed.
    pub fn now(self) -> Option<R> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(_) => None,
        }
    }

    pub async fn finish(self) -> Option<R> {
        match self {
            Self::Ready(result) => result,
            Self::Pending(future) => future.await,
        }
    }
}
