//! Function references: the identity objects that key everything stored in a [Mock](crate::Mock).

use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::signature::{MockableAsyncFn, MockableFn};

static NEXT_FN_ID: AtomicU64 = AtomicU64::new(1);

/// The process-wide unique identity of one mockable function.
///
/// A new id is minted for every constructed reference. There is no public constructor,
/// so an id can't be forged from the outside.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FnId(u64);

impl FnId {
    pub(crate) fn mint() -> Self {
        Self(NEXT_FN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Static information about a [MockFn].
#[derive(Clone, Copy, Debug)]
pub struct MockFnInfo {
    /// The identity that keys the registry.
    pub id: FnId,
    /// Name used in diagnostics.
    pub name: &'static str,
}

impl fmt::Display for MockFnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Common interface of [MockRef] and [AsyncMockRef].
///
/// The associated types describe the mocked function's signature, and are what
/// allows the registry to recover strongly typed calls and producers from its type-erased storage.
pub trait MockFn {
    /// The arguments of the mocked function, usually a tuple.
    type Args: Send + Sync + 'static;

    /// The result of the mocked function.
    ///
    /// `()` for functions returning nothing, `Option<T>` for functions with an optional result.
    type Output: Send + Sync + 'static;

    /// Identity and name of the function.
    fn info(&self) -> MockFnInfo;

    /// Shorthand for `self.info().id`.
    fn id(&self) -> FnId {
        self.info().id
    }
}

impl<T, F> MockFn for Lazy<T, F>
where
    T: MockFn,
    F: FnOnce() -> T,
{
    type Args = T::Args;
    type Output = T::Output;

    fn info(&self) -> MockFnInfo {
        Lazy::force(self).info()
    }
}

/// The function value captured by a reference.
#[derive(Clone)]
struct Captured {
    info: MockFnInfo,
    fn_type: TypeId,
    function: Arc<dyn Any + Send + Sync>,
}

impl Captured {
    fn new<F: Send + Sync + 'static>(function: F) -> Self {
        Self {
            info: MockFnInfo {
                id: FnId::mint(),
                name: core::any::type_name::<F>(),
            },
            fn_type: TypeId::of::<F>(),
            function: Arc::new(function),
        }
    }

    fn named(mut self, name: &'static str) -> Self {
        self.info.name = name;
        self
    }

    fn is_fn<G: 'static>(&self) -> bool {
        self.fn_type == TypeId::of::<G>()
    }

    fn function<G: 'static>(&self) -> Option<&G> {
        self.function.downcast_ref()
    }
}

/// A reference to one synchronous mockable function with arguments `A` and result `R`.
///
/// Create one reference per mocked function and keep it for the lifetime of the mock:
/// every construction mints a new [FnId], and a re-created reference would not see
/// the calls or the result registered through the old one.
///
/// ```rust
/// use callrec::*;
///
/// trait Greeter {
///     fn greet(&self, name: String, age: u32) -> String;
/// }
///
/// struct MockGreeter {
///     mock: Mock,
///     greet_ref: MockRef<(String, u32), String>,
/// }
///
/// impl MockGreeter {
///     fn new() -> Self {
///         Self {
///             mock: Mock::new(),
///             greet_ref: MockRef::new(<Self as Greeter>::greet),
///         }
///     }
/// }
///
/// impl Mockable for MockGreeter {
///     fn mock(&self) -> &Mock {
///         &self.mock
///     }
/// }
///
/// impl Greeter for MockGreeter {
///     fn greet(&self, name: String, age: u32) -> String {
///         self.invoke(&self.greet_ref, (name, age))
///     }
/// }
/// ```
pub struct MockRef<A, R> {
    captured: Captured,
    signature: PhantomData<fn(A) -> R>,
}

impl<A, R> MockRef<A, R> {
    /// Create a reference capturing `function`, typically the mocked method item itself.
    ///
    /// The signature of `function` must have arguments `A` and result `R`,
    /// see [MockableFn] for how parameters map to `A`.
    /// The function value is not called by the registry.
    /// The diagnostic name defaults to the type name of `function`, which for fn items is their path.
    ///
    /// ```compile_fail
    /// use callrec::MockRef;
    ///
    /// fn greet(name: String, age: u8) -> String {
    ///     format!("{name} {age}")
    /// }
    ///
    /// let greet_ref = MockRef::<u64, Vec<bool>>::new(greet);
    /// ```
    pub fn new<F, Sig>(function: F) -> Self
    where
        F: MockableFn<A, R, Sig>,
    {
        Self::untyped(function)
    }

    /// Create a reference capturing any `function`, without checking its signature.
    ///
    /// For methods taking borrowed parameters, like `&str`, which are recorded as owned arguments.
    pub fn untyped<F>(function: F) -> Self
    where
        F: Send + Sync + 'static,
    {
        Self {
            captured: Captured::new(function),
            signature: PhantomData,
        }
    }

    /// Override the name used in diagnostics.
    pub fn named(self, name: &'static str) -> Self {
        Self {
            captured: self.captured.named(name),
            signature: PhantomData,
        }
    }

    /// The unique identity of this reference.
    pub fn id(&self) -> FnId {
        self.captured.info.id
    }

    /// The name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.captured.info.name
    }

    /// Whether this reference was constructed from a function value of the same type as `function`.
    ///
    /// Every fn item has its own type, so this tells whether the reference was made from exactly that function.
    pub fn is_fn<G: 'static>(&self, _function: G) -> bool {
        self.captured.is_fn::<G>()
    }

    /// The captured function value, if it is of type `G`.
    pub fn function<G: 'static>(&self) -> Option<&G> {
        self.captured.function()
    }
}

/// A reference to one asynchronous mockable function, whose result `R` is produced by a future.
///
/// Identity works exactly like [MockRef]. Calls are recorded through the `invoke_async` family of
/// [Mock](crate::Mock), and results may be produced asynchronously with
/// [Mock::register_async_result](crate::Mock::register_async_result).
pub struct AsyncMockRef<A, R> {
    captured: Captured,
    signature: PhantomData<fn(A) -> R>,
}

impl<A, R> AsyncMockRef<A, R> {
    /// Create a reference capturing the async `function`, whose future outputs `R`.
    pub fn new<F, Sig>(function: F) -> Self
    where
        F: MockableAsyncFn<A, R, Sig>,
    {
        Self::untyped(function)
    }

    /// Create a reference capturing any `function`, without checking its signature.
    pub fn untyped<F>(function: F) -> Self
    where
        F: Send + Sync + 'static,
    {
        Self {
            captured: Captured::new(function),
            signature: PhantomData,
        }
    }

    /// Override the name used in diagnostics.
    pub fn named(self, name: &'static str) -> Self {
        Self {
            captured: self.captured.named(name),
            signature: PhantomData,
        }
    }

    /// The unique identity of this reference.
    pub fn id(&self) -> FnId {
        self.captured.info.id
    }

    /// The name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.captured.info.name
    }

    /// Whether this reference was constructed from a function value of the same type as `function`.
    pub fn is_fn<G: 'static>(&self, _function: G) -> bool {
        self.captured.is_fn::<G>()
    }

    /// The captured function value, if it is of type `G`.
    pub fn function<G: 'static>(&self) -> Option<&G> {
        self.captured.function()
    }
}

macro_rules! impl_ref_traits {
    ($ty:ident) => {
        impl<A, R> MockFn for $ty<A, R>
        where
            A: Send + Sync + 'static,
            R: Send + Sync + 'static,
        {
            type Args = A;
            type Output = R;

            fn info(&self) -> MockFnInfo {
                self.captured.info
            }
        }

        // Cloning shares the identity, it does not construct a new reference.
        impl<A, R> Clone for $ty<A, R> {
            fn clone(&self) -> Self {
                Self {
                    captured: self.captured.clone(),
                    signature: PhantomData,
                }
            }
        }

        impl<A, R> PartialEq for $ty<A, R> {
            fn eq(&self, other: &Self) -> bool {
                self.captured.info.id == other.captured.info.id
            }
        }

        impl<A, R> Eq for $ty<A, R> {}

        impl<A, R> Hash for $ty<A, R> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.captured.info.id.hash(state);
            }
        }

        impl<A, R> fmt::Debug for $ty<A, R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("id", &self.captured.info.id)
                    .field("name", &self.captured.info.name)
                    .finish()
            }
        }
    };
}

impl_ref_traits!(MockRef);
impl_ref_traits!(AsyncMockRef);

/// A [MockRef] that is constructed on first access, for use as a mock struct field.
pub type LazyMockRef<A, R> = Lazy<MockRef<A, R>>;

/// An [AsyncMockRef] that is constructed on first access, for use as a mock struct field.
pub type LazyAsyncMockRef<A, R> = Lazy<AsyncMockRef<A, R>>;
