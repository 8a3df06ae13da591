//! Bindings for the parts of the HERE Maps for JavaScript API (`window.H`) the map view uses.
//! The SDK scripts are loaded by `index.html`; nothing here works before they have run.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["H", "service"])]
    pub type Platform;

    #[wasm_bindgen(constructor, js_namespace = ["H", "service"], js_class = "Platform", catch)]
    pub fn new(options: &JsValue) -> Result<Platform, JsValue>;

    #[wasm_bindgen(method, js_name = createDefaultLayers, catch)]
    pub fn create_default_layers(this: &Platform) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = H, js_name = Map)]
    #[derive(Clone)]
    pub type HereMap;

    #[wasm_bindgen(constructor, js_namespace = H, js_class = "Map", catch)]
    pub fn new(
        element: &web_sys::HtmlElement,
        base_layer: &JsValue,
        options: &JsValue,
    ) -> Result<HereMap, JsValue>;

    #[wasm_bindgen(method, js_name = addObject)]
    pub fn add_object(this: &HereMap, object: &Group);

    #[wasm_bindgen(method, js_name = getViewPort)]
    pub fn view_port(this: &HereMap) -> ViewPort;

    #[wasm_bindgen(method)]
    pub fn dispose(this: &HereMap);

    pub type ViewPort;

    #[wasm_bindgen(method)]
    pub fn resize(this: &ViewPort);

    #[wasm_bindgen(js_namespace = ["H", "ui"], js_name = UI)]
    pub type Ui;

    #[wasm_bindgen(static_method_of = Ui, js_namespace = ["H", "ui"], js_class = "UI", js_name = createDefault, catch)]
    pub fn create_default(map: &HereMap, layers: &JsValue) -> Result<Ui, JsValue>;

    #[wasm_bindgen(method, js_name = getBubbles)]
    pub fn bubbles(this: &Ui) -> Array;

    #[wasm_bindgen(method, js_name = addBubble)]
    pub fn add_bubble(this: &Ui, bubble: &InfoBubble);

    #[wasm_bindgen(method, js_name = removeBubble)]
    pub fn remove_bubble(this: &Ui, bubble: &JsValue);

    #[wasm_bindgen(js_namespace = ["H", "ui"])]
    pub type InfoBubble;

    #[wasm_bindgen(constructor, js_namespace = ["H", "ui"], js_class = "InfoBubble", catch)]
    pub fn new(position: &JsValue, options: &JsValue) -> Result<InfoBubble, JsValue>;

    #[wasm_bindgen(method, js_name = getState)]
    pub fn state(this: &InfoBubble) -> String;

    #[wasm_bindgen(method, js_name = addEventListener)]
    pub fn add_event_listener(this: &InfoBubble, kind: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, js_name = removeEventListener)]
    pub fn remove_event_listener(this: &InfoBubble, kind: &str, handler: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["H", "mapevents"])]
    pub type MapEvents;

    #[wasm_bindgen(constructor, js_namespace = ["H", "mapevents"], js_class = "MapEvents", catch)]
    pub fn new(map: &HereMap) -> Result<MapEvents, JsValue>;

    #[wasm_bindgen(js_namespace = ["H", "mapevents"])]
    pub type Behavior;

    #[wasm_bindgen(constructor, js_namespace = ["H", "mapevents"], js_class = "Behavior", catch)]
    pub fn new(events: &MapEvents) -> Result<Behavior, JsValue>;

    #[wasm_bindgen(js_namespace = ["H", "map"])]
    pub type Group;

    #[wasm_bindgen(constructor, js_namespace = ["H", "map"], js_class = "Group", catch)]
    pub fn new() -> Result<Group, JsValue>;

    #[wasm_bindgen(method, js_name = addObject)]
    pub fn add_object(this: &Group, object: &Marker);

    #[wasm_bindgen(method, js_name = removeObject)]
    pub fn remove_object(this: &Group, object: &Marker);

    #[wasm_bindgen(method, js_name = addEventListener)]
    pub fn add_event_listener(this: &Group, kind: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, js_name = removeEventListener)]
    pub fn remove_event_listener(this: &Group, kind: &str, handler: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["H", "map"])]
    pub type Icon;

    #[wasm_bindgen(constructor, js_namespace = ["H", "map"], js_class = "Icon", catch)]
    pub fn new(bitmap: &str, options: &JsValue) -> Result<Icon, JsValue>;

    #[wasm_bindgen(js_namespace = ["H", "map"])]
    pub type Marker;

    #[wasm_bindgen(constructor, js_namespace = ["H", "map"], js_class = "Marker", catch)]
    pub fn new(position: &JsValue, options: &JsValue) -> Result<Marker, JsValue>;

    #[wasm_bindgen(method, js_name = getData)]
    pub fn data(this: &Marker) -> JsValue;
}

/// `true` once the SDK scripts have defined `window.H`.
pub fn sdk_available() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    Reflect::get(window.as_ref(), &JsValue::from_str("H"))
        .map(|h| !h.is_undefined() && !h.is_null())
        .unwrap_or(false)
}

/// Resolve a dotted property path, e.g. `vector.normal.map` on the default layer set.
pub fn property_path(root: &JsValue, path: &str) -> Result<JsValue, JsValue> {
    let mut current = root.clone();
    for key in path.split('.') {
        current = Reflect::get(&current, &JsValue::from_str(key))?;
        if current.is_undefined() {
            return Err(JsValue::from_str(&format!("missing property {path}")));
        }
    }
    Ok(current)
}

/// Plain `{ key: value }` object for SDK option bags.
pub fn options_object(entries: &[(&str, &JsValue)]) -> Result<JsValue, JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value)?;
    }
    Ok(object.into())
}

pub fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{err:?}"))
}
