//! Browser tests against the page's real history.
//!
//! Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use query_sync::{history, BrowserHistory, HistoryBackend, ParamMap, QuerySubscription};
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn window() -> web_sys::Window {
    web_sys::window().unwrap()
}

#[wasm_bindgen_test]
fn intercepts_push_state_from_any_caller() {
    history::ensure_interception_installed().unwrap();

    let refreshes = Rc::new(Cell::new(0));
    let r = Rc::clone(&refreshes);
    let subscription = QuerySubscription::mount(move || r.set(r.get() + 1)).unwrap();
    let (params, _) = subscription.use_query_params().unwrap();
    params.get("tomato");

    // Straight through web-sys, bypassing query-sync entirely.
    window()
        .history()
        .unwrap()
        .push_state_with_url(&JsValue::NULL, "", Some("?tomato=GREEN"))
        .unwrap();

    assert_eq!(refreshes.get(), 1);
}

#[wasm_bindgen_test]
fn set_params_updates_location() {
    history::ensure_interception_installed().unwrap();
    let subscription = QuerySubscription::mount(|| {}).unwrap();
    let (_, set_params) = subscription.use_query_params().unwrap();

    set_params.replace(ParamMap::new().with("tomato", ["RED", "ROUND"]));

    assert_eq!(
        window().location().search().unwrap(),
        "?tomato=RED&tomato=ROUND"
    );
}

#[wasm_bindgen_test]
fn second_wrap_is_a_no_op() {
    let backend = BrowserHistory::new().unwrap();
    let calls = Rc::new(Cell::new(0));
    let c = Rc::clone(&calls);
    backend.intercept(Rc::new(move || c.set(c.get() + 1))).unwrap();
    history::ensure_interception_installed().unwrap();

    backend.replace_state(&Value::Null, "?once=1").unwrap();

    // One wrapper dispatches one navigate event.
    assert_eq!(calls.get(), 1);
}
