use crate::counter::CompletionCounter;
use hrepr_core::{LoadStatus, ResourceKey};
use std::collections::HashMap;
use std::rc::Rc;

/// What `load_all` has to do for one resource after registering a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Inject,
    Wait,
    Ready,
}

/// Status table and waiter groups, shared by every batch of one loader.
#[derive(Default)]
pub(crate) struct LoaderState {
    statuses: HashMap<ResourceKey, LoadStatus>,
    waiters: HashMap<ResourceKey, Vec<Rc<CompletionCounter>>>,
    attempts: HashMap<ResourceKey, u32>,
}

impl LoaderState {
    pub(crate) fn status(&self, key: &ResourceKey) -> LoadStatus {
        self.statuses.get(key).copied().unwrap_or_default()
    }

    pub(crate) fn register(&mut self, key: &ResourceKey, counter: &Rc<CompletionCounter>) -> Step {
        match self.status(key) {
            LoadStatus::NotRequested => {
                self.statuses.insert(key.clone(), LoadStatus::Loading);
                self.waiters.entry(key.clone()).or_default().push(Rc::clone(counter));
                Step::Inject
            }
            LoadStatus::Loading => {
                self.waiters.entry(key.clone()).or_default().push(Rc::clone(counter));
                Step::Wait
            }
            LoadStatus::Loaded => Step::Ready,
        }
    }

    /// Counts a new injection of `key` and returns its attempt number.
    pub(crate) fn begin_attempt(&mut self, key: &ResourceKey) -> u32 {
        let attempts = self.attempts.entry(key.clone()).or_insert(0);
        *attempts += 1;
        *attempts
    }

    pub(crate) fn attempts(&self, key: &ResourceKey) -> u32 {
        self.attempts.get(key).copied().unwrap_or(0)
    }

    /// Marks `key` loaded and hands back its drained waiter group.
    pub(crate) fn mark_loaded(&mut self, key: &ResourceKey) -> Vec<Rc<CompletionCounter>> {
        self.statuses.insert(key.clone(), LoadStatus::Loaded);
        self.attempts.remove(key);
        self.waiters.remove(key).unwrap_or_default()
    }

    /// Forgets `key` so a later request starts over, and hands back its
    /// drained waiter group.
    pub(crate) fn mark_failed(&mut self, key: &ResourceKey) -> Vec<Rc<CompletionCounter>> {
        self.statuses.remove(key);
        self.attempts.remove(key);
        self.waiters.remove(key).unwrap_or_default()
    }

    pub(crate) fn pending(&self, key: &ResourceKey) -> usize {
        self.waiters
            .get(key)
            .map_or(0, |group| group.iter().filter(|c| !c.is_done()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Rc<CompletionCounter> {
        Rc::new(CompletionCounter::new(1, Box::new(|_| {})))
    }

    #[test]
    fn first_registration_injects_then_waits() {
        let mut state = LoaderState::default();
        let key = ResourceKey::from("a.js");
        assert_eq!(state.register(&key, &counter()), Step::Inject);
        assert_eq!(state.register(&key, &counter()), Step::Wait);
        assert_eq!(state.status(&key), LoadStatus::Loading);
        assert_eq!(state.pending(&key), 2);
    }

    #[test]
    fn loaded_resources_skip_the_waiter_group() {
        let mut state = LoaderState::default();
        let key = ResourceKey::from("a.js");
        state.register(&key, &counter());
        assert_eq!(state.mark_loaded(&key).len(), 1);
        assert_eq!(state.register(&key, &counter()), Step::Ready);
        assert_eq!(state.pending(&key), 0);
    }

    #[test]
    fn failure_resets_status_and_attempts() {
        let mut state = LoaderState::default();
        let key = ResourceKey::from("a.js");
        state.register(&key, &counter());
        assert_eq!(state.begin_attempt(&key), 1);
        assert_eq!(state.begin_attempt(&key), 2);
        assert_eq!(state.mark_failed(&key).len(), 1);
        assert_eq!(state.status(&key), LoadStatus::NotRequested);
        assert_eq!(state.attempts(&key), 0);
    }
}
