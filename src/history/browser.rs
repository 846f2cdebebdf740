//! The page's own history, through `web-sys`.

use crate::error::{QueryError, Result};
use js_sys::{Function, Reflect};
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Event, History, Window};

use super::backend::HistoryBackend;

/// Event the wrapped history functions dispatch on `window`.
pub const NAVIGATE_EVENT: &str = "querysync:navigate";

/// Marker property set on `window.history` once it is wrapped.
const PATCHED_MARKER: &str = "__querySyncPatched";

const WRAPPED_METHODS: [&str; 2] = ["pushState", "replaceState"];

type JsResult = std::result::Result<JsValue, JsValue>;

fn js_error(context: &str, err: JsValue) -> QueryError {
    QueryError::History(format!("{}: {:?}", context, err))
}

/// History of the window this module runs in.
#[derive(Clone, Debug)]
pub struct BrowserHistory {
    window: Window,
    history: History,
}

impl BrowserHistory {
    pub fn new() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| QueryError::Unavailable("window".to_string()))?;
        let history = window
            .history()
            .map_err(|_| QueryError::Unavailable("window.history".to_string()))?;
        Ok(Self { window, history })
    }

    /// Convert a history state object into a JS value.
    fn state_to_js(state: &Value) -> Result<JsValue> {
        if state.is_null() {
            return Ok(JsValue::NULL);
        }
        let text = serde_json::to_string(state)?;
        js_sys::JSON::parse(&text).map_err(|e| js_error("state", e))
    }

    /// Replace `history.pushState` and `history.replaceState` with wrappers
    /// that call the original and then dispatch [`NAVIGATE_EVENT`].
    ///
    /// Guarded by a marker on the history object so that several bundles
    /// sharing one page wrap the functions only once.
    fn wrap_history_methods(&self) -> Result<()> {
        let history: &JsValue = self.history.as_ref();
        let marker = JsValue::from_str(PATCHED_MARKER);
        if Reflect::has(history, &marker).unwrap_or(false) {
            tracing::debug!("history functions already wrapped on this page");
            return Ok(());
        }

        for name in WRAPPED_METHODS {
            let original: Function = Reflect::get(history, &JsValue::from_str(name))
                .map_err(|e| js_error(name, e))?
                .dyn_into()
                .map_err(|_| QueryError::Unavailable(format!("history.{}", name)))?;
            let target = history.clone();
            let window = self.window.clone();

            let wrapper = Closure::<dyn Fn(JsValue, JsValue, JsValue) -> JsResult>::new(
                move |state: JsValue, title: JsValue, url: JsValue| {
                    let result = original.call3(&target, &state, &title, &url)?;
                    let event = Event::new(NAVIGATE_EVENT)?;
                    window.dispatch_event(&event)?;
                    Ok(result)
                },
            );
            Reflect::set(history, &JsValue::from_str(name), wrapper.as_ref())
                .map_err(|e| js_error(name, e))?;
            // The page keeps the wrapper for its whole lifetime.
            wrapper.forget();
        }

        Reflect::set(history, &marker, &JsValue::TRUE).map_err(|e| js_error("marker", e))?;
        Ok(())
    }
}

impl HistoryBackend for BrowserHistory {
    fn href(&self) -> Result<String> {
        self.window
            .location()
            .href()
            .map_err(|e| js_error("location.href", e))
    }

    fn push_state(&self, state: &Value, url: &str) -> Result<()> {
        self.history
            .push_state_with_url(&Self::state_to_js(state)?, "", Some(url))
            .map_err(|e| js_error("pushState", e))
    }

    fn replace_state(&self, state: &Value, url: &str) -> Result<()> {
        self.history
            .replace_state_with_url(&Self::state_to_js(state)?, "", Some(url))
            .map_err(|e| js_error("replaceState", e))
    }

    fn assign(&self, url: &str) -> Result<()> {
        self.window
            .location()
            .assign(url)
            .map_err(|e| js_error("location.assign", e))
    }

    fn intercept(&self, on_change: Rc<dyn Fn()>) -> Result<()> {
        self.wrap_history_methods()?;

        for event in ["popstate", NAVIGATE_EVENT] {
            let on_change = Rc::clone(&on_change);
            let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| on_change());
            self.window
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(|e| js_error(event, e))?;
            listener.forget();
        }
        Ok(())
    }
}
