use leptos::prelude::*;

use crate::map_view::MapView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    Map,
}

impl Route {
    /// Only the site root is routed; everything else renders nothing.
    pub(crate) fn from_path(path: &str) -> Option<Self> {
        match path {
            "" | "/" => Some(Route::Map),
            _ => None,
        }
    }
}

fn current_path() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    match Route::from_path(&current_path()) {
        Some(Route::Map) => view! { <MapView /> }.into_any(),
        None => ().into_any(),
    }
}
