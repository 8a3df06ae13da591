use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::html::Div;
use leptos::prelude::*;

use wildfire_shared::format::{format_coordinates, wildfire_count_label};
use wildfire_shared::{RenderState, ViewState, WildfireEvent};

use crate::config;
use crate::feed_loader::{self, Liveness};
use crate::here_backend::HereBackend;
use crate::here_sdk;
use crate::map_widget::{MapController, MapError, MapOptions};
use crate::time_format::started_label;

thread_local! {
    static MAP_CONTROLLER: RefCell<Option<MapController<HereBackend>>> = const { RefCell::new(None) };
}

static SDK_MISSING_WARNED: AtomicBool = AtomicBool::new(false);

/// Which of the three top-level branches is on screen. Kept separate from
/// [`ViewState`] so data updates don't rebuild the map container.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Branch {
    Error(String),
    Loading,
    Content,
}

impl From<RenderState<'_>> for Branch {
    fn from(state: RenderState<'_>) -> Self {
        match state {
            RenderState::Error(message) => Branch::Error(message.to_string()),
            RenderState::Loading => Branch::Loading,
            RenderState::Content => Branch::Content,
        }
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
}

fn warn_sdk_missing_once() {
    if SDK_MISSING_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&"HERE Maps SDK (window.H) is not loaded; map not shown.".into());
    }
}

fn marker_tap_handler(selected: RwSignal<Option<WildfireEvent>>) -> Rc<dyn Fn(usize)> {
    Rc::new(move |index| {
        let result = MAP_CONTROLLER.with(|slot| {
            let Ok(mut slot) = slot.try_borrow_mut() else {
                return None;
            };
            slot.as_mut().map(|controller| controller.tap(index))
        });
        match result {
            Some(Ok(Some(event))) => selected.set(Some(event)),
            Some(Err(e)) => {
                web_sys::console::error_1(&format!("Error opening wildfire details: {e}").into());
            }
            _ => {}
        }
    })
}

/// Build the widget on first call for this mount, then mirror `wildfires` as markers.
fn sync_map(
    container: web_sys::HtmlElement,
    wildfires: &[WildfireEvent],
    selected: RwSignal<Option<WildfireEvent>>,
) -> Result<(), MapError> {
    MAP_CONTROLLER.with(|slot| -> Result<(), MapError> {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            let config = config::load()?;
            let backend =
                HereBackend::new(container, config.maps_api_key, marker_tap_handler(selected));
            *slot = Some(MapController::new(backend));
        }
        let Some(controller) = slot.as_mut() else {
            return Err(MapError::NotMounted);
        };

        let created = controller.mount(&MapOptions::with_pixel_ratio(device_pixel_ratio()))?;
        controller.sync(wildfires)?;
        if created {
            web_sys::console::info_1(
                &format!("Map widget created with {} markers", controller.marker_count()).into(),
            );
        }
        Ok(())
    })
}

fn teardown_map() {
    let controller = MAP_CONTROLLER.with(|slot| slot.borrow_mut().take());
    if let Some(mut controller) = controller {
        controller.dispose();
    }
}

#[component]
pub fn MapView() -> impl IntoView {
    let state: RwSignal<ViewState> = RwSignal::new(ViewState::default());
    let selected: RwSignal<Option<WildfireEvent>> = RwSignal::new(None);
    let container: NodeRef<Div> = NodeRef::new();
    let liveness = Liveness::new();

    feed_loader::load(state, liveness.clone());

    let branch = Memo::new(move |_| state.with(|s| Branch::from(s.render_state())));

    // Widget lifecycle: runs whenever data readiness or the container changes.
    Effect::new(move || {
        let Some(element) = container.get() else {
            return;
        };
        let Some(wildfires) = state.with(|s| s.ready_for_map().then(|| s.wildfires.clone()))
        else {
            return;
        };
        if !here_sdk::sdk_available() {
            warn_sdk_missing_once();
            return;
        }

        if let Err(e) = sync_map(element.into(), &wildfires, selected) {
            web_sys::console::error_1(&format!("Error initializing map: {e}").into());
            teardown_map();
            state.update(|s| s.fail_map_init());
        }
    });

    on_cleanup(move || {
        liveness.end();
        teardown_map();
    });

    move || match branch.get() {
        Branch::Error(message) => view! { <ErrorBanner message=message /> }.into_any(),
        Branch::Loading => view! { <LoadingPlaceholder /> }.into_any(),
        Branch::Content => view! {
            <div style="max-width: 1280px; margin: 0 auto; padding: 32px 16px; font-family: 'Inter', system-ui, sans-serif;">
                <h1 style="font-size: 1.875rem; font-weight: 700; margin: 0 0 24px; color: #1f2937;">
                    "Global Wildfire Tracker"
                </h1>
                <div style="display: flex; flex-wrap: wrap; gap: 24px;">
                    <div style="flex: 3 1 480px; min-width: 0;">
                        <div style="background: #fff; border-radius: 8px; box-shadow: 0 10px 15px rgba(0,0,0,0.1); overflow: hidden;">
                            <div node_ref=container style="width: 100%; height: 70vh; min-height: 500px;" />
                        </div>
                    </div>
                    <div style="flex: 1 1 240px;">
                        <DetailsPanel selected=selected />
                        <div style="background: #fff; border-radius: 8px; box-shadow: 0 10px 15px rgba(0,0,0,0.1); padding: 16px; margin-top: 16px;">
                            <p style="margin: 0; font-size: 0.875rem; color: #4b5563;">
                                {move || state.with(|s| wildfire_count_label(s.wildfires.len()))}
                            </p>
                        </div>
                    </div>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
fn DetailsPanel(selected: RwSignal<Option<WildfireEvent>>) -> impl IntoView {
    view! {
        <div style="background: #fff; border-radius: 8px; box-shadow: 0 10px 15px rgba(0,0,0,0.1); padding: 16px;">
            <h2 style="font-size: 1.25rem; font-weight: 600; margin: 0 0 16px;">"Wildfire Details"</h2>
            {move || match selected.get() {
                Some(fire) => {
                    let started = started_label(fire.started_at());
                    let coordinates = format_coordinates(&fire).unwrap_or_default();
                    view! {
                        <div>
                            <h3 style="font-weight: 700; font-size: 1.125rem; margin: 0 0 8px;">{fire.title}</h3>
                            <p style="color: #4b5563; margin: 0 0 8px;">{started}</p>
                            <p style="font-size: 0.875rem; color: #6b7280; margin: 0;">
                                "Coordinates: " {coordinates}
                            </p>
                        </div>
                    }
                    .into_any()
                }
                None => view! {
                    <p style="color: #6b7280; margin: 0;">"Click on a fire icon to see details"</p>
                }
                .into_any(),
            }}
        </div>
    }
}

#[component]
fn ErrorBanner(message: String) -> impl IntoView {
    view! {
        <div style="display: flex; align-items: center; justify-content: center; height: 100vh;">
            <div
                role="alert"
                style="background: #fee2e2; border: 1px solid #f87171; color: #b91c1c; padding: 12px 16px; border-radius: 4px;"
            >
                <strong style="font-weight: 700;">"Error:"</strong>
                <span>" " {message}</span>
            </div>
        </div>
    }
}

#[component]
fn LoadingPlaceholder() -> impl IntoView {
    view! {
        <div style="display: flex; align-items: center; justify-content: center; height: 100vh;">
            <div class="pulse" style="display: flex; flex-direction: column; align-items: center;">
                <div style="height: 128px; width: 128px; margin-bottom: 16px; border-radius: 9999px; background: #e5e7eb;" />
                <div style="height: 16px; width: 192px; border-radius: 4px; background: #e5e7eb;" />
                <p style="margin-top: 16px; color: #4b5563;">"Loading wildfire data..."</p>
            </div>
        </div>
    }
}
