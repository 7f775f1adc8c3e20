use hrepr_core::{ErrorCategory, LoadError, LoadStatus};
use hrepr_dom::Document;
use hrepr_loader::ScriptLoader;
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<Result<(), LoadError>>>>;

fn setup() -> (Rc<Document>, ScriptLoader<Rc<Document>>) {
    let doc = Rc::new(Document::new());
    let loader = ScriptLoader::new(Rc::clone(&doc));
    (doc, loader)
}

fn recorder() -> (Calls, impl FnOnce(Result<(), LoadError>) + 'static) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    (calls, move |r| sink.borrow_mut().push(r))
}

#[test]
fn empty_request_completes_synchronously() {
    let (doc, loader) = setup();
    let (calls, cb) = recorder();
    loader.load_all(Vec::<String>::new(), cb);
    assert_eq!(calls.borrow().len(), 1);
    assert!(doc.scripts().is_empty());
}

#[test]
fn fresh_batch_loads_each_key_once_and_waits_for_all() {
    let (doc, loader) = setup();
    let (calls, cb) = recorder();
    loader.load_all(["a.js", "b.js", "c.js"], cb);
    assert_eq!(doc.scripts(), vec!["a.js", "b.js", "c.js"]);
    assert_eq!(loader.status("a.js"), LoadStatus::Loading);

    doc.complete_load("a.js");
    doc.complete_load("c.js");
    assert!(calls.borrow().is_empty());

    doc.complete_load("b.js");
    assert_eq!(calls.borrow().len(), 1);
    assert!(calls.borrow()[0].is_ok());
}

#[test]
fn overlapping_batches_share_one_load() {
    let (doc, loader) = setup();
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    loader.load_all(["a.js"], cb1);
    loader.load_all(["a.js", "b.js"], cb2);

    assert_eq!(doc.scripts(), vec!["a.js", "b.js"]);
    assert_eq!(loader.pending("a.js"), 2);

    doc.complete_load("a.js");
    assert_eq!(first.borrow().len(), 1);
    assert!(second.borrow().is_empty());

    doc.complete_load("b.js");
    assert_eq!(first.borrow().len(), 1);
    assert_eq!(second.borrow().len(), 1);
}

#[test]
fn loaded_resources_complete_synchronously_without_new_tags() {
    let (doc, loader) = setup();
    loader.load_all(["a.js"], |_| {});
    doc.complete_load("a.js");

    for _ in 0..2 {
        let (calls, cb) = recorder();
        loader.load_all(["a.js"], cb);
        assert_eq!(calls.borrow().len(), 1);
    }
    assert_eq!(doc.scripts(), vec!["a.js"]);
}

#[test]
fn mixed_loaded_and_new_resources() {
    let (doc, loader) = setup();
    loader.load_all(["a.js"], |_| {});
    doc.complete_load("a.js");

    let (calls, cb) = recorder();
    loader.load_all(["a.js", "b.js"], cb);
    assert!(calls.borrow().is_empty());
    doc.complete_load("b.js");
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn callbacks_may_request_the_resource_they_waited_for() {
    let (doc, loader) = setup();
    let (inner_calls, inner_cb) = recorder();
    let reentrant = loader.clone();
    loader.load_all(["a.js"], move |result| {
        assert!(result.is_ok());
        reentrant.load_all(["a.js"], inner_cb);
    });

    doc.complete_load("a.js");
    assert_eq!(inner_calls.borrow().len(), 1);
    assert_eq!(doc.scripts(), vec!["a.js"]);
}

#[test]
fn failure_fails_every_waiting_batch_once() {
    let (doc, loader) = setup();
    let (first, cb1) = recorder();
    let (second, cb2) = recorder();
    loader.load_all(["a.js", "b.js"], cb1);
    loader.load_all(["b.js"], cb2);

    doc.fail_load("b.js", "404");
    doc.complete_load("a.js");

    for calls in [&first, &second] {
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        let err = calls[0].as_ref().unwrap_err();
        assert_eq!(err.category, ErrorCategory::Network);
        assert_eq!(err.resource.as_ref().map(|k| k.as_str()), Some("b.js"));
    }
    assert!(loader.is_loaded("a.js"));
    assert_eq!(loader.status("b.js"), LoadStatus::NotRequested);
}

#[test]
fn failed_resource_is_requested_again_later() {
    let (doc, loader) = setup();
    loader.load_all(["a.js"], |_| {});
    doc.fail_load("a.js", "network down");

    let (calls, cb) = recorder();
    loader.load_all(["a.js"], cb);
    assert_eq!(doc.scripts(), vec!["a.js", "a.js"]);
    doc.complete_load("a.js");
    assert!(calls.borrow()[0].is_ok());
}

#[tokio::test]
async fn load_future_resolves_after_events() {
    let (doc, loader) = setup();
    let mut future = loader.load(["a.js", "b.js"]);
    assert!(futures_poll(&mut future).is_none());

    doc.complete_load("a.js");
    doc.complete_load("b.js");
    assert!(future.await.is_ok());
}

fn futures_poll(future: &mut hrepr_loader::LoadFuture) -> Option<Result<(), LoadError>> {
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    match Pin::new(future).poll(&mut cx) {
        Poll::Ready(result) => Some(result),
        Poll::Pending => None,
    }
}
