//! Externally resolvable values.
//!
//! [`deferred`] splits a value that does not exist yet into a [`Resolver`],
//! owned by whoever produces the value, and a [`Pending`] future that any
//! number of consumers can clone and await. Resolving consumes the resolver,
//! so a value is delivered at most once.

use crate::error::LoadError;
use futures::channel::oneshot::{self, Canceled};
use futures::future::{FutureExt, Map, Shared};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

type Settle<T> = fn(Result<T, Canceled>) -> Result<T, LoadError>;

fn settle<T>(received: Result<T, Canceled>) -> Result<T, LoadError> {
    received.map_err(|_| LoadError::cancelled("Resolver dropped before resolving"))
}

pub fn deferred<T: Clone>() -> (Resolver<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    let pending = Pending {
        inner: rx.map(settle::<T> as Settle<T>).shared(),
    };
    (Resolver { tx }, pending)
}

#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Resolver<T> {
    /// Delivers `value` to every clone of the matching [`Pending`].
    pub fn resolve(self, value: T) {
        // Nobody listening any more is fine.
        let _ = self.tx.send(value);
    }
}

pub struct Pending<T: Clone> {
    inner: Shared<Map<oneshot::Receiver<T>, Settle<T>>>,
}

impl<T: Clone> Pending<T> {
    /// The value if it was already delivered, without waiting.
    pub fn try_get(&self) -> Option<Result<T, LoadError>> {
        self.inner.clone().now_or_never()
    }
}

impl<T: Clone> Clone for Pending<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone> std::fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

impl<T: Clone> Future for Pending<T> {
    type Output = Result<T, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    #[test]
    fn unresolved_has_no_value() {
        let (_resolver, pending) = deferred::<u32>();
        assert!(pending.try_get().is_none());
    }

    #[tokio::test]
    async fn every_clone_sees_the_value() {
        let (resolver, pending) = deferred();
        let other = pending.clone();
        resolver.resolve(String::from("widget"));
        assert_eq!(pending.await.unwrap(), "widget");
        assert_eq!(other.try_get().unwrap().unwrap(), "widget");
    }

    #[tokio::test]
    async fn dropped_resolver_cancels() {
        let (resolver, pending) = deferred::<u32>();
        drop(resolver);
        let err = pending.await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::Cancelled);
    }
}
