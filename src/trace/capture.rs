//! Selection of the errors recorded on the span.
//!
//! Errors are never swallowed: whichever policy is used, the error returned by the inner service
//! reaches the caller untouched. The policy only decides whether the span is marked as failed.

use std::{error::Error as StdError, fmt, marker::PhantomData};

/// Decides whether an error returned by the inner service is recorded on the span.
pub trait CaptureErrors<E> {
    /// Returns `true` if `error` must be recorded.
    fn capture(&self, error: &E) -> bool;
}

/// Records every error.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureAll;

impl<E> CaptureErrors<E> for CaptureAll {
    fn capture(&self, _: &E) -> bool {
        true
    }
}

/// Records no error.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureNone;

impl<E> CaptureErrors<E> for CaptureNone {
    fn capture(&self, _: &E) -> bool {
        false
    }
}

impl<E, F> CaptureErrors<E> for F
where
    F: Fn(&E) -> bool,
{
    fn capture(&self, error: &E) -> bool {
        self(error)
    }
}

/// Records boxed errors whose concrete type is `T`.
///
/// Works with services failing with [`tower::BoxError`] and similar boxed error types.
///
/// [`tower::BoxError`]: https://docs.rs/tower/latest/tower/type.BoxError.html
pub struct CaptureType<T>(PhantomData<fn() -> T>);

impl<T> CaptureType<T> {
    /// Creates the policy, usually spelled `CaptureType::<MyError>::new()`.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CaptureType<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CaptureType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CaptureType<T> {}

impl<T> fmt::Debug for CaptureType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CaptureType")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> CaptureErrors<Box<dyn StdError + Send + Sync>> for CaptureType<T>
where
    T: StdError + 'static,
{
    fn capture(&self, error: &Box<dyn StdError + Send + Sync>) -> bool {
        error.is::<T>()
    }
}

impl<T> CaptureErrors<Box<dyn StdError>> for CaptureType<T>
where
    T: StdError + 'static,
{
    fn capture(&self, error: &Box<dyn StdError>) -> bool {
        error.is::<T>()
    }
}
