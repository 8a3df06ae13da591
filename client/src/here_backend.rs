use std::rc::Rc;

use js_sys::Reflect;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use wildfire_shared::feed::LatLng;

use crate::here_sdk::{
    self, Behavior, Group, HereMap, Icon, InfoBubble, MapEvents, Marker, Platform, Ui,
};
use crate::map_widget::{MapBackend, MapError, MapOptions};

pub const FIRE_ICON_URL: &str = "/assets/fire.svg";
const FIRE_ICON_SIZE_PX: u32 = 24;
const BASE_LAYER_PATH: &str = "vector.normal.map";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HereMapOptions {
    center: LatLng,
    zoom: f64,
    pixel_ratio: f64,
}

#[derive(Serialize)]
struct IconSize {
    w: u32,
    h: u32,
}

#[derive(Serialize)]
struct IconOptions {
    size: IconSize,
}

fn sdk_err(err: JsValue) -> MapError {
    MapError::Sdk(here_sdk::describe(&err))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, MapError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| MapError::Sdk(e.to_string()))
}

struct Widget {
    map: HereMap,
    ui: Ui,
    group: Group,
    icon: Icon,
    _behavior: Behavior,
    tap_handler: Closure<dyn Fn(JsValue)>,
}

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

struct OpenBubble {
    bubble: InfoBubble,
    on_state_change: Closure<dyn Fn(JsValue)>,
}

/// [`MapBackend`] over the HERE Maps JS SDK, rendering into one container element.
pub struct HereBackend {
    container: web_sys::HtmlElement,
    api_key: String,
    on_marker_tap: Rc<dyn Fn(usize)>,
    widget: Option<Widget>,
    resize: Option<ResizeBinding>,
    open_bubbles: Vec<OpenBubble>,
}

impl HereBackend {
    pub fn new(
        container: web_sys::HtmlElement,
        api_key: String,
        on_marker_tap: Rc<dyn Fn(usize)>,
    ) -> Self {
        Self {
            container,
            api_key,
            on_marker_tap,
            widget: None,
            resize: None,
            open_bubbles: Vec::new(),
        }
    }

    fn widget(&self) -> Result<&Widget, MapError> {
        self.widget.as_ref().ok_or(MapError::NotMounted)
    }
}

impl MapBackend for HereBackend {
    type Marker = Marker;
    type Style = web_sys::Element;

    fn create_map(&mut self, options: &MapOptions) -> Result<(), MapError> {
        let platform_options =
            here_sdk::options_object(&[("apikey", &JsValue::from_str(&self.api_key))])
                .map_err(sdk_err)?;
        let platform = Platform::new(&platform_options).map_err(sdk_err)?;
        let layers = platform.create_default_layers().map_err(sdk_err)?;
        let base_layer = here_sdk::property_path(&layers, BASE_LAYER_PATH).map_err(sdk_err)?;

        let map_options = to_js(&HereMapOptions {
            center: options.center,
            zoom: options.zoom,
            pixel_ratio: options.pixel_ratio,
        })?;
        let map = HereMap::new(&self.container, &base_layer, &map_options).map_err(sdk_err)?;

        let ui = Ui::create_default(&map, &layers).map_err(sdk_err)?;
        let events = MapEvents::new(&map).map_err(sdk_err)?;
        let behavior = Behavior::new(&events).map_err(sdk_err)?;

        let icon_options = to_js(&IconOptions {
            size: IconSize {
                w: FIRE_ICON_SIZE_PX,
                h: FIRE_ICON_SIZE_PX,
            },
        })?;
        let icon = Icon::new(FIRE_ICON_URL, &icon_options).map_err(sdk_err)?;

        let group = Group::new().map_err(sdk_err)?;
        map.add_object(&group);

        let on_marker_tap = Rc::clone(&self.on_marker_tap);
        let tap_handler = Closure::<dyn Fn(JsValue)>::new(move |evt: JsValue| {
            let Ok(target) = Reflect::get(&evt, &JsValue::from_str("target")) else {
                return;
            };
            let Some(marker) = target.dyn_ref::<Marker>() else {
                return;
            };
            let Some(index) = marker.data().as_f64() else {
                return;
            };
            on_marker_tap(index as usize);
        });
        group.add_event_listener("tap", tap_handler.as_ref().unchecked_ref());

        self.widget = Some(Widget {
            map,
            ui,
            group,
            icon,
            _behavior: behavior,
            tap_handler,
        });
        Ok(())
    }

    fn add_marker(&mut self, position: LatLng, index: usize) -> Result<Marker, MapError> {
        let widget = self.widget()?;
        let icon: &JsValue = widget.icon.as_ref();
        let options = here_sdk::options_object(&[
            ("icon", icon),
            ("data", &JsValue::from_f64(index as f64)),
        ])
        .map_err(sdk_err)?;
        let marker = Marker::new(&to_js(&position)?, &options).map_err(sdk_err)?;
        widget.group.add_object(&marker);
        Ok(marker)
    }

    fn remove_marker(&mut self, marker: Marker) {
        if let Some(widget) = &self.widget {
            widget.group.remove_object(&marker);
        }
    }

    fn close_bubbles(&mut self) {
        for open in self.open_bubbles.drain(..) {
            open.bubble.remove_event_listener(
                "statechange",
                open.on_state_change.as_ref().unchecked_ref(),
            );
        }
        if let Some(widget) = &self.widget {
            for bubble in widget.ui.bubbles().iter() {
                widget.ui.remove_bubble(&bubble);
            }
        }
    }

    fn open_bubble(
        &mut self,
        position: LatLng,
        html: &str,
        style: &web_sys::Element,
    ) -> Result<(), MapError> {
        let widget = self.widget()?;
        let options = here_sdk::options_object(&[("content", &JsValue::from_str(html))])
            .map_err(sdk_err)?;
        let bubble = InfoBubble::new(&to_js(&position)?, &options).map_err(sdk_err)?;

        let style = style.clone();
        let on_state_change = Closure::<dyn Fn(JsValue)>::new(move |evt: JsValue| {
            let Ok(target) = Reflect::get(&evt, &JsValue::from_str("target")) else {
                return;
            };
            if target.unchecked_ref::<InfoBubble>().state() == "closed" {
                style.remove();
            }
        });
        bubble.add_event_listener("statechange", on_state_change.as_ref().unchecked_ref());
        widget.ui.add_bubble(&bubble);

        self.open_bubbles.push(OpenBubble {
            bubble,
            on_state_change,
        });
        Ok(())
    }

    fn inject_style(&mut self, css: &str) -> Result<web_sys::Element, MapError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| MapError::Sdk("no document".into()))?;
        let head = document
            .head()
            .ok_or_else(|| MapError::Sdk("document has no <head>".into()))?;
        let element = document.create_element("style").map_err(sdk_err)?;
        element.set_text_content(Some(css));
        head.append_child(&element).map_err(sdk_err)?;
        Ok(element)
    }

    fn remove_style(&mut self, style: &web_sys::Element) {
        // Detached elements ignore remove().
        style.remove();
    }

    fn listen_resize(&mut self) -> Result<(), MapError> {
        let map = self.widget()?.map.clone();
        let window = web_sys::window().ok_or_else(|| MapError::Sdk("no window".into()))?;
        let handler = Closure::<dyn Fn()>::new(move || {
            map.view_port().resize();
        });
        window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .map_err(sdk_err)?;
        self.resize = Some(ResizeBinding { window, handler });
        Ok(())
    }

    fn unlisten_resize(&mut self) {
        if let Some(binding) = self.resize.take() {
            let _ = binding.window.remove_event_listener_with_callback(
                "resize",
                binding.handler.as_ref().unchecked_ref(),
            );
        }
    }

    fn dispose_map(&mut self) {
        self.unlisten_resize();
        if let Some(widget) = self.widget.take() {
            widget
                .group
                .remove_event_listener("tap", widget.tap_handler.as_ref().unchecked_ref());
            widget.map.dispose();
        }
    }
}
