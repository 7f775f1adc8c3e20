//! Deduplicated script loading with fan-out completion.
//!
//! A [`ScriptLoader`] makes sure every script it is asked for is injected
//! into the document at most once at a time, and tells each batch request
//! when all of *its* scripts are loaded, whether it triggered them, found
//! them in flight, or found them already loaded.

mod counter;
mod state;

use counter::CompletionCounter;
use futures::channel::oneshot;
use hrepr_core::{DomBridge, LoadError, LoadStatus, LoaderConfig, ResourceKey};
use state::{LoaderState, Step};
use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use tracing::{debug, warn};

struct Inner<B> {
    bridge: B,
    config: LoaderConfig,
    state: RefCell<LoaderState>,
}

/// Shared handle over one loader state. Clones see the same status table.
///
/// Single-threaded: the bridge delivers load events on the thread that owns
/// the loader. State borrows are never held while a callback or a bridge
/// call runs, so callbacks may freely issue new requests.
pub struct ScriptLoader<B: DomBridge> {
    inner: Rc<Inner<B>>,
}

impl<B: DomBridge> Clone for ScriptLoader<B> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<B: DomBridge + 'static> ScriptLoader<B> {
    pub fn new(bridge: B) -> Self {
        Self::with_config(bridge, LoaderConfig::default())
    }

    pub fn with_config(bridge: B, config: LoaderConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                bridge,
                config,
                state: RefCell::new(LoaderState::default()),
            }),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.inner.bridge
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub fn status(&self, key: impl Into<ResourceKey>) -> LoadStatus {
        self.inner.state.borrow().status(&key.into())
    }

    pub fn is_loaded(&self, key: impl Into<ResourceKey>) -> bool {
        self.status(key) == LoadStatus::Loaded
    }

    /// Number of unfinished batches waiting on `key`.
    pub fn pending(&self, key: impl Into<ResourceKey>) -> usize {
        self.inner.state.borrow().pending(&key.into())
    }

    /// Requests every resource in `resources` and calls `on_done` exactly once:
    /// with `Ok(())` when all of them are loaded, or with the first failure.
    ///
    /// An empty request completes synchronously, as does a request whose
    /// resources are all loaded already.
    pub fn load_all<I, K, F>(&self, resources: I, on_done: F)
    where
        I: IntoIterator<Item = K>,
        K: Into<ResourceKey>,
        F: FnOnce(Result<(), LoadError>) + 'static,
    {
        let mut seen = HashSet::new();
        let keys: Vec<ResourceKey> = resources
            .into_iter()
            .map(|key: K| -> ResourceKey { key.into() })
            .filter(|key| seen.insert(key.clone()))
            .collect();

        if keys.is_empty() {
            on_done(Ok(()));
            return;
        }

        let counter = Rc::new(CompletionCounter::new(keys.len(), Box::new(on_done)));
        for key in keys {
            let step = self.inner.state.borrow_mut().register(&key, &counter);
            match step {
                Step::Inject => self.inject(&key),
                Step::Wait => debug!(resource = %key, "script already loading"),
                Step::Ready => counter.tick(),
            }
        }
    }

    /// Async form of [`load_all`](Self::load_all).
    pub fn load<I, K>(&self, resources: I) -> LoadFuture
    where
        I: IntoIterator<Item = K>,
        K: Into<ResourceKey>,
    {
        let (tx, rx) = oneshot::channel();
        self.load_all(resources, move |result| {
            let _ = tx.send(result);
        });
        LoadFuture { rx }
    }

    /// Marks `key` loaded and completes every batch that was only waiting on it.
    pub fn notify_loaded(&self, key: &ResourceKey) {
        if self.status(key) == LoadStatus::Loaded {
            return;
        }
        let waiters = self.inner.state.borrow_mut().mark_loaded(key);
        debug!(resource = %key, waiters = waiters.len(), "script loaded");
        for counter in waiters {
            counter.tick();
        }
    }

    /// Applies the failure policy to `key`: retry it, or fail every batch
    /// waiting on it.
    pub fn notify_failed(&self, key: &ResourceKey, error: LoadError) {
        let error = match error.resource {
            Some(_) => error,
            None => error.for_resource(key),
        };

        let (status, attempts) = {
            let state = self.inner.state.borrow();
            (state.status(key), state.attempts(key))
        };
        if status != LoadStatus::Loading {
            return;
        }

        if error.recoverable && attempts < self.inner.config.max_attempts() {
            warn!(resource = %key, attempt = attempts, %error, "script failed to load, retrying");
            self.inject(key);
            return;
        }

        let waiters = self.inner.state.borrow_mut().mark_failed(key);
        warn!(resource = %key, waiters = waiters.len(), %error, "script failed to load");
        for counter in waiters {
            counter.fail(error.clone());
        }
    }

    fn inject(&self, key: &ResourceKey) {
        let attempt = self.inner.state.borrow_mut().begin_attempt(key);
        debug!(resource = %key, attempt, "injecting script");
        if let Err(error) = self.append_script(key) {
            self.notify_failed(key, error);
        }
    }

    fn append_script(&self, key: &ResourceKey) -> Result<(), LoadError> {
        let bridge = &self.inner.bridge;
        let mut element = bridge.create_element("script")?;
        bridge.set_attribute(&mut element, "src", key.as_str())?;

        let loader = Rc::downgrade(&self.inner);
        let resource = key.clone();
        bridge.on_load(
            &mut element,
            Box::new(move |result: Result<(), LoadError>| {
                // The loader may be gone by the time the host reports back.
                let Some(inner) = loader.upgrade() else { return };
                let loader = ScriptLoader { inner };
                match result {
                    Ok(()) => loader.notify_loaded(&resource),
                    Err(error) => loader.notify_failed(&resource, error),
                }
            }),
        )?;

        bridge.append_to_head(element)
    }
}

/// Completion of one [`ScriptLoader::load`] batch.
#[must_use = "futures do nothing unless awaited"]
pub struct LoadFuture {
    rx: oneshot::Receiver<Result<(), LoadError>>,
}

impl Future for LoadFuture {
    type Output = Result<(), LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| Err(LoadError::cancelled("Loader dropped before the batch completed")))
        })
    }
}
