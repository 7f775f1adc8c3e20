use hrepr_core::{DomBridge, LoadError, LoadHandler};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::injector::ScriptInjector;

/// A script element that only exists on the loader side until appended.
#[derive(Debug)]
pub struct ScriptElement {
    id: u64,
    src: Option<String>,
}

/// Outcome of one injection, sent back to the loader's thread.
#[derive(Debug)]
pub struct LoadEvent {
    pub element: u64,
    pub src: String,
    pub result: Result<(), LoadError>,
}

pub type LoadEvents = mpsc::UnboundedReceiver<LoadEvent>;

struct Injection {
    element: u64,
    src: String,
}

/// [`DomBridge`] in front of an asynchronous [`ScriptInjector`].
///
/// Appending a script hands it to a tokio task that runs the injection;
/// results come back as [`LoadEvent`]s which must be passed to
/// [`dispatch`](ChromiumBridge::dispatch) on the loader's thread, usually
/// through [`drive`](ChromiumBridge::drive).
pub struct ChromiumBridge {
    next_id: Cell<u64>,
    handlers: RefCell<HashMap<u64, LoadHandler>>,
    injections: mpsc::UnboundedSender<Injection>,
}

impl ChromiumBridge {
    /// Starts the injection task. Must be called inside a tokio runtime.
    pub fn spawn(injector: Arc<dyn ScriptInjector>) -> (Self, LoadEvents) {
        let (injections, mut pending) = mpsc::unbounded_channel::<Injection>();
        let (events_tx, events) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(injection) = pending.recv().await {
                let injector = Arc::clone(&injector);
                let events_tx = events_tx.clone();
                tokio::spawn(async move {
                    let result = injector.inject(&injection.src).await;
                    let _ = events_tx.send(LoadEvent {
                        element: injection.element,
                        src: injection.src,
                        result,
                    });
                });
            }
        });

        let bridge = Self {
            next_id: Cell::new(0),
            handlers: RefCell::new(HashMap::new()),
            injections,
        };
        (bridge, events)
    }

    /// Runs the handler registered for the event's element.
    /// Returns `false` for events nobody is waiting for.
    pub fn dispatch(&self, event: LoadEvent) -> bool {
        let handler = self.handlers.borrow_mut().remove(&event.element);
        match handler {
            Some(handler) => {
                debug!(src = %event.src, ok = event.result.is_ok(), "dispatching load event");
                handler(event.result);
                true
            }
            None => {
                warn!(src = %event.src, element = event.element, "load event without handler");
                false
            }
        }
    }

    /// Awaits `future` while dispatching load events as they arrive.
    pub async fn drive<F: Future>(&self, events: &mut LoadEvents, future: F) -> F::Output {
        tokio::pin!(future);
        let mut open = true;
        loop {
            tokio::select! {
                output = &mut future => return output,
                event = events.recv(), if open => match event {
                    Some(event) => {
                        self.dispatch(event);
                    }
                    None => open = false,
                },
            }
        }
    }

    /// Number of injected scripts still waiting for their event.
    pub fn in_flight(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl DomBridge for ChromiumBridge {
    type Element = ScriptElement;

    fn create_element(&self, tag: &str) -> Result<ScriptElement, LoadError> {
        if !tag.eq_ignore_ascii_case("script") {
            return Err(LoadError::bridge(format!("cannot create <{}> elements", tag)));
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(ScriptElement { id, src: None })
    }

    fn set_attribute(&self, element: &mut ScriptElement, name: &str, value: &str) -> Result<(), LoadError> {
        match name {
            "src" => {
                element.src = Some(value.to_string());
                Ok(())
            }
            _ => Err(LoadError::bridge(format!("unsupported script attribute {}", name))),
        }
    }

    fn on_load(&self, element: &mut ScriptElement, handler: LoadHandler) -> Result<(), LoadError> {
        self.handlers.borrow_mut().insert(element.id, handler);
        Ok(())
    }

    fn append_to_head(&self, element: ScriptElement) -> Result<(), LoadError> {
        let Some(src) = element.src else {
            self.handlers.borrow_mut().remove(&element.id);
            return Err(LoadError::bridge("script element has no src"));
        };
        if self.injections.send(Injection { element: element.id, src }).is_err() {
            self.handlers.borrow_mut().remove(&element.id);
            return Err(LoadError::bridge("injection task stopped"));
        }
        Ok(())
    }
}
