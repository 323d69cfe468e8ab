//! Function signatures, as seen by a function reference.
//!
//! A method `fn(&S, T1, T2) -> R` maps to arguments `(T1, T2)` and result `R`.
//! The receiver is dropped, a single remaining parameter is not tupled, and no parameters map to `()`.
//! Free functions and closures map the same way, without a receiver.

use core::future::Future;
use core::marker::PhantomData;

/// A function value with arguments `A` and result `R`, accepted by [MockRef::new](crate::MockRef::new).
///
/// `Sig` is inferred from the function, it only keeps the implementations apart.
pub trait MockableFn<A, R, Sig>: Send + Sync + 'static {}

/// An async function value with arguments `A`, whose future outputs `R`.
/// Accepted by [AsyncMockRef::new](crate::AsyncMockRef::new).
pub trait MockableAsyncFn<A, R, Sig>: Send + Sync + 'static {}

/// Shape of a free function or closure taking `Params`.
pub struct FreeFn<Params>(PhantomData<fn(Params)>);

/// Shape of a method on `S` taking `Params` after the receiver.
pub struct Method<S, Params>(PhantomData<fn(S, Params)>);

macro_rules! impl_signatures {
    ($args:ty; $($param:ident),*) => {
        impl<F, R, $($param,)*> MockableFn<$args, R, FreeFn<($($param,)*)>> for F where
            F: Fn($($param),*) -> R + Send + Sync + 'static
        {
        }

        impl<F, S, R, $($param,)*> MockableFn<$args, R, Method<S, ($($param,)*)>> for F
        where
            S: 'static,
            F: Fn(&'static S, $($param),*) -> R + Send + Sync + 'static,
        {
        }

        impl<F, Fut, R, $($param,)*> MockableAsyncFn<$args, R, FreeFn<($($param,)*)>> for F
        where
            F: Fn($($param),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R>,
        {
        }

        impl<F, Fut, S, R, $($param,)*> MockableAsyncFn<$args, R, Method<S, ($($param,)*)>> for F
        where
            S: 'static,
            F: Fn(&'static S, $($param),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R>,
        {
        }
    };
}

impl_signatures!((); );
impl_signatures!(T1; T1);
impl_signatures!((T1, T2); T1, T2);
impl_signatures!((T1, T2, T3); T1, T2, T3);
impl_signatures!((T1, T2, T3, T4); T1, T2, T3, T4);
