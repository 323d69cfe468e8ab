use std::collections::BTreeMap;

use crate::call::AnyCall;
use crate::mock_ref::FnId;
use crate::responder::DynProducer;

/// Everything a [Mock](crate::Mock) stores, keyed by function identity.
#[derive(Default)]
pub(crate) struct RegistryState {
    /// Append-only call logs, in call order.
    pub calls: BTreeMap<FnId, Vec<AnyCall>>,
    /// At most one producer per function.
    pub producers: BTreeMap<FnId, DynProducer>,
}

/// The registry lock.
///
/// All access goes through [MutexIsh::locked], so a guard can never be held across an `.await`.
pub(crate) struct MutexIsh<T> {
    #[cfg(not(feature = "spin-lock"))]
    inner: ::std::sync::Mutex<T>,

    #[cfg(feature = "spin-lock")]
    inner: ::spin::Mutex<T>,
}

#[cfg(not(feature = "spin-lock"))]
impl<T> MutexIsh<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ::std::sync::Mutex::new(value),
        }
    }

    pub fn locked<U>(&self, func: impl FnOnce(&mut T) -> U) -> U {
        // critical sections are single map operations, so a poisoned state is still consistent
        let mut lock = self
            .inner
            .lock()
            .unwrap_or_else(::std::sync::PoisonError::into_inner);
        func(&mut *lock)
    }
}

#[cfg(feature = "spin-lock")]
impl<T> MutexIsh<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ::spin::Mutex::new(value),
        }
    }

    pub fn locked<U>(&self, func: impl FnOnce(&mut T) -> U) -> U {
        let mut lock = self.inner.lock();
        func(&mut *lock)
    }
}

impl<T: Default> Default for MutexIsh<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
