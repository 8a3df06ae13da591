mod app;
mod config;
mod feed_loader;
mod here_backend;
mod here_sdk;
mod map_view;
mod map_widget;
mod time_format;

use std::any::Any;
use std::cell::RefCell;

use leptos::mount::mount_to;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Element `index.html` reserves for the tracker.
const MOUNT_ELEMENT_ID: &str = "app";

thread_local! {
    // Dropping the handle unmounts the tree, which disposes the map widget.
    static MOUNTED_APP: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

fn mount_target(document: &Document) -> Option<HtmlElement> {
    let reserved = document
        .get_element_by_id(MOUNT_ELEMENT_ID)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());
    if reserved.is_some() {
        return reserved;
    }
    web_sys::console::warn_1(
        &format!("#{MOUNT_ELEMENT_ID} not found; mounting wildfire tracker on <body>").into(),
    );
    document.body()
}

fn start() -> Result<(), &'static str> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or("no browser document")?;
    let target = mount_target(&document).ok_or("no element to mount on")?;

    MOUNTED_APP.with(|slot| {
        // Tear down any earlier mount before its map widget and feed load are duplicated.
        drop(slot.borrow_mut().take());
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
    Ok(())
}

fn main() {
    console_error_panic_hook::set_once();
    if let Err(reason) = start() {
        web_sys::console::error_1(&format!("Wildfire tracker not started: {reason}").into());
    }
}
