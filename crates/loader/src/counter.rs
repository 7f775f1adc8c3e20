use hrepr_core::LoadError;
use std::cell::{Cell, RefCell};

pub(crate) type DoneCallback = Box<dyn FnOnce(Result<(), LoadError>)>;

/// One batch request: how many of its resources are still outstanding, and
/// the callback to run once. The callback is taken out before it runs, so it
/// can neither fire twice nor observe the counter mid-update.
pub(crate) struct CompletionCounter {
    remaining: Cell<usize>,
    callback: RefCell<Option<DoneCallback>>,
}

impl CompletionCounter {
    pub(crate) fn new(remaining: usize, callback: DoneCallback) -> Self {
        Self {
            remaining: Cell::new(remaining),
            callback: RefCell::new(Some(callback)),
        }
    }

    /// One of the batch's resources is loaded.
    pub(crate) fn tick(&self) {
        if self.is_done() {
            return;
        }
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            self.fire(Ok(()));
        }
    }

    /// One of the batch's resources failed; the whole batch fails.
    pub(crate) fn fail(&self, error: LoadError) {
        self.fire(Err(error));
    }

    pub(crate) fn is_done(&self) -> bool {
        self.callback.borrow().is_none()
    }

    fn fire(&self, result: Result<(), LoadError>) {
        let callback = self.callback.borrow_mut().take();
        if let Some(callback) = callback {
            callback(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recording(remaining: usize) -> (CompletionCounter, Rc<RefCell<Vec<Result<(), LoadError>>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let counter = CompletionCounter::new(remaining, Box::new(move |r| sink.borrow_mut().push(r)));
        (counter, calls)
    }

    #[test]
    fn fires_on_last_tick_only() {
        let (counter, calls) = recording(2);
        counter.tick();
        assert!(calls.borrow().is_empty());
        counter.tick();
        assert_eq!(calls.borrow().len(), 1);
        counter.tick();
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn failure_wins_and_fires_once() {
        let (counter, calls) = recording(2);
        counter.fail(LoadError::load_failed("a.js", "404"));
        counter.tick();
        counter.tick();
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_err());
    }
}
