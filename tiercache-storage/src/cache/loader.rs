//! On-demand value loaders.
//!
//! A loader is the authoritative recomputation source consulted after the
//! memory tier. It comes in three shapes, resolved by [`Loader::resolve`].

use std::fmt;
use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use tiercache_core::BoxError;

/// Future produced by a loader. `Ok(None)` means the loader had no value.
pub type LoadFuture<'a, T> = BoxFuture<'a, Result<Option<T>, BoxError>>;

/// Source of a fresh value for a single lookup.
pub enum Loader<'a, T> {
    /// An already-resolved value.
    Value(T),
    /// A pending computation, awaited directly.
    Future(LoadFuture<'a, T>),
    /// A producer invoked only when the loader tier is reached.
    Producer(Box<dyn FnOnce() -> LoadFuture<'a, T> + Send + 'a>),
}

impl<'a, T> Loader<'a, T>
where
    T: Send + 'a,
{
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn future<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<Option<T>, E>> + Send + 'a,
        E: Into<BoxError> + 'a,
    {
        Self::Future(async move { future.await.map_err(Into::<BoxError>::into) }.boxed())
    }

    pub fn producer<P, F, E>(producer: P) -> Self
    where
        P: FnOnce() -> F + Send + 'a,
        F: Future<Output = Result<Option<T>, E>> + Send + 'a,
        E: Into<BoxError> + 'a,
    {
        Self::Producer(Box::new(move || {
            let future = producer();
            async move { future.await.map_err(Into::<BoxError>::into) }.boxed()
        }))
    }

    /// Resolve to the loaded value.
    ///
    /// A producer is invoked and its future awaited; a future is awaited; a
    /// value is returned as is.
    pub async fn resolve(self) -> Result<Option<T>, BoxError> {
        match self {
            Self::Value(value) => Ok(Some(value)),
            Self::Future(future) => future.await,
            Self::Producer(producer) => producer().await,
        }
    }
}

impl<T> fmt::Debug for Loader<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::Value(_) => "Value",
            Self::Future(_) => "Future",
            Self::Producer(_) => "Producer",
        };
        f.debug_tuple("Loader").field(&shape).finish()
    }
}
