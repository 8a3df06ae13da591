use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use wildfire_shared::{FeedError, ViewState, WildfireEvent, parse_feed};

use crate::config;

/// Cleared when the owning view unmounts. Async continuations check it before
/// touching view state.
#[derive(Debug, Clone)]
pub(crate) struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn end(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// GET the feed and keep only wildfire events.
pub async fn fetch_wildfires(url: &str) -> Result<Vec<WildfireEvent>, FeedError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(FeedError::Status(resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;
    parse_feed(&body)
}

/// Apply a finished fetch to `state` unless the view has gone. Returns whether
/// the result was applied.
pub(crate) fn settle(
    state: &mut ViewState,
    liveness: &Liveness,
    result: Result<Vec<WildfireEvent>, FeedError>,
) -> bool {
    if !liveness.is_alive() {
        return false;
    }
    state.finish_load(result);
    true
}

/// Fetch once and settle `state`. Results arriving after unmount are dropped.
pub(crate) fn load(state: RwSignal<ViewState>, liveness: Liveness) {
    let url = config::feed_url();
    spawn_local(async move {
        let result = fetch_wildfires(&url).await;
        if let Err(e) = &result {
            web_sys::console::error_1(&format!("Error fetching wildfire data: {e}").into());
        }

        let applied = state
            .try_update(|s| settle(s, &liveness, result))
            .unwrap_or(false);
        if !applied {
            web_sys::console::info_1(&"Map view unmounted, discarding wildfire feed".into());
        }
    });
}
