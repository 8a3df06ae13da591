use wildfire_shared::WildfireEvent;
use wildfire_shared::feed::LatLng;
use wildfire_shared::format::bubble_html;

use crate::time_format::locale_date;

pub const INITIAL_CENTER: LatLng = LatLng { lat: 0.0, lng: 0.0 };
pub const INITIAL_ZOOM: f64 = 2.0;

/// Shrinks the SDK's bubble close button. Lives in `<head>` only while a bubble is open.
pub const BUBBLE_CLOSE_CSS: &str = ".H_ib_close { font-size: 12px !important; width: 20px !important; height: 20px !important; line-height: 20px !important; }";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("maps SDK error: {0}")]
    Sdk(String),
    #[error("configuration error: {0}")]
    Config(#[from] wildfire_shared::ConfigError),
    #[error("map widget is not mounted")]
    NotMounted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: f64,
    pub pixel_ratio: f64,
}

impl MapOptions {
    pub fn with_pixel_ratio(pixel_ratio: f64) -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }
}

/// The imperative surface of a maps SDK, as the controller needs it.
///
/// Markers are tagged with the index of their source event; a tap on a marker
/// must come back to the controller as [`MapController::tap`] with that index.
pub trait MapBackend {
    type Marker;
    type Style: Clone;

    /// Build platform, layers, map, UI, behaviour and the marker group.
    fn create_map(&mut self, options: &MapOptions) -> Result<(), MapError>;
    fn add_marker(&mut self, position: LatLng, index: usize) -> Result<Self::Marker, MapError>;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn close_bubbles(&mut self);
    /// Open a bubble; the SDK reporting it closed must release `style`.
    fn open_bubble(
        &mut self,
        position: LatLng,
        html: &str,
        style: &Self::Style,
    ) -> Result<(), MapError>;
    fn inject_style(&mut self, css: &str) -> Result<Self::Style, MapError>;
    /// Must tolerate a style that was already released.
    fn remove_style(&mut self, style: &Self::Style);
    fn listen_resize(&mut self) -> Result<(), MapError>;
    fn unlisten_resize(&mut self);
    fn dispose_map(&mut self);
}

enum Lifecycle<M> {
    Uninitialized,
    Ready { markers: Vec<M> },
    Disposed,
}

/// Owns one map widget for the lifetime of a view mount.
///
/// `Uninitialized -> Ready -> Disposed`. `mount` on a Ready controller is a
/// no-op, so reactive reruns never build a second widget.
pub struct MapController<B: MapBackend> {
    backend: B,
    state: Lifecycle<B::Marker>,
    events: Vec<WildfireEvent>,
    styles: Vec<B::Style>,
}

impl<B: MapBackend> MapController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Lifecycle::Uninitialized,
            events: Vec::new(),
            styles: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, Lifecycle::Ready { .. })
    }

    #[cfg(test)]
    pub fn is_disposed(&self) -> bool {
        matches!(self.state, Lifecycle::Disposed)
    }

    pub fn marker_count(&self) -> usize {
        match &self.state {
            Lifecycle::Ready { markers } => markers.len(),
            _ => 0,
        }
    }

    /// Returns `true` when a widget was built by this call.
    pub fn mount(&mut self, options: &MapOptions) -> Result<bool, MapError> {
        if self.is_ready() {
            return Ok(false);
        }
        self.backend.create_map(options)?;
        if let Err(err) = self.backend.listen_resize() {
            self.backend.dispose_map();
            return Err(err);
        }
        self.state = Lifecycle::Ready {
            markers: Vec::new(),
        };
        Ok(true)
    }

    /// Replace every marker with one per event.
    pub fn sync(&mut self, events: &[WildfireEvent]) -> Result<(), MapError> {
        let Lifecycle::Ready { markers } = &mut self.state else {
            return Err(MapError::NotMounted);
        };
        for marker in markers.drain(..) {
            self.backend.remove_marker(marker);
        }
        self.events.clear();

        for (index, event) in events.iter().enumerate() {
            let Some(position) = event.position() else {
                continue;
            };
            markers.push(self.backend.add_marker(position, index)?);
        }
        self.events.extend_from_slice(events);
        Ok(())
    }

    /// Handle a marker tap: swap the open bubble for one describing `index`.
    /// Returns the event to show as the selected fire.
    pub fn tap(&mut self, index: usize) -> Result<Option<WildfireEvent>, MapError> {
        if !self.is_ready() {
            return Err(MapError::NotMounted);
        }
        let Some(event) = self.events.get(index).cloned() else {
            return Ok(None);
        };
        let Some(position) = event.position() else {
            return Ok(None);
        };

        self.backend.close_bubbles();
        self.release_styles();

        let style = self.backend.inject_style(BUBBLE_CLOSE_CSS)?;
        self.styles.push(style.clone());

        let started = event.started_at().map(|d| locale_date(&d)).unwrap_or_default();
        self.backend
            .open_bubble(position, &bubble_html(&event.title, &started), &style)?;
        Ok(Some(event))
    }

    /// Tear the widget down. Safe to call in any state.
    pub fn dispose(&mut self) {
        let markers = match std::mem::replace(&mut self.state, Lifecycle::Disposed) {
            Lifecycle::Ready { markers } => markers,
            other => {
                self.state = other;
                return;
            }
        };

        self.backend.unlisten_resize();
        for marker in markers {
            self.backend.remove_marker(marker);
        }
        self.backend.close_bubbles();
        self.release_styles();
        self.backend.dispose_map();
        self.events.clear();
    }

    fn release_styles(&mut self) {
        for style in self.styles.drain(..) {
            self.backend.remove_style(&style);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::rc::Rc;

    use super::*;
    use wildfire_shared::parse_feed;

    #[derive(Default, Debug)]
    struct Recorded {
        maps_created: u32,
        maps_disposed: u32,
        live_markers: BTreeSet<u32>,
        marker_positions: Vec<(LatLng, usize)>,
        resize_listeners: i32,
        open_bubbles: Vec<String>,
        live_styles: BTreeSet<u32>,
        fail_create: bool,
    }

    #[derive(Clone, Default)]
    struct FakeBackend {
        log: Rc<RefCell<Recorded>>,
        next_id: Rc<RefCell<u32>>,
    }

    impl FakeBackend {
        fn id(&self) -> u32 {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            *next
        }

        /// What the SDK does when a user closes the bubble.
        fn user_closes_bubble(&self, style: u32) {
            let mut log = self.log.borrow_mut();
            log.open_bubbles.clear();
            log.live_styles.remove(&style);
        }
    }

    impl MapBackend for FakeBackend {
        type Marker = u32;
        type Style = u32;

        fn create_map(&mut self, _options: &MapOptions) -> Result<(), MapError> {
            let mut log = self.log.borrow_mut();
            if log.fail_create {
                return Err(MapError::Sdk("H.service.Platform failed".into()));
            }
            log.maps_created += 1;
            Ok(())
        }

        fn add_marker(&mut self, position: LatLng, index: usize) -> Result<u32, MapError> {
            let id = self.id();
            let mut log = self.log.borrow_mut();
            log.live_markers.insert(id);
            log.marker_positions.push((position, index));
            Ok(id)
        }

        fn remove_marker(&mut self, marker: u32) {
            self.log.borrow_mut().live_markers.remove(&marker);
        }

        fn close_bubbles(&mut self) {
            self.log.borrow_mut().open_bubbles.clear();
        }

        fn open_bubble(
            &mut self,
            _position: LatLng,
            html: &str,
            _style: &u32,
        ) -> Result<(), MapError> {
            self.log.borrow_mut().open_bubbles.push(html.to_string());
            Ok(())
        }

        fn inject_style(&mut self, _css: &str) -> Result<u32, MapError> {
            let id = self.id();
            self.log.borrow_mut().live_styles.insert(id);
            Ok(id)
        }

        fn remove_style(&mut self, style: &u32) {
            self.log.borrow_mut().live_styles.remove(style);
        }

        fn listen_resize(&mut self) -> Result<(), MapError> {
            self.log.borrow_mut().resize_listeners += 1;
            Ok(())
        }

        fn unlisten_resize(&mut self) {
            self.log.borrow_mut().resize_listeners -= 1;
        }

        fn dispose_map(&mut self) {
            self.log.borrow_mut().maps_disposed += 1;
        }
    }

    fn fires(count: usize) -> Vec<WildfireEvent> {
        let events: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"title":"Fire {i}","categories":[{{"title":"Wildfires"}}],
                    "geometries":[{{"date":"2024-06-0{}T00:00:00Z","coordinates":[{}.5,{}.25]}}]}}"#,
                    i + 1,
                    i,
                    i
                )
            })
            .collect();
        parse_feed(&format!(r#"{{"events":[{}]}}"#, events.join(","))).unwrap()
    }

    fn canyon_fire() -> Vec<WildfireEvent> {
        parse_feed(
            r#"{"events":[{"title":"Canyon Fire","categories":[{"title":"Wildfires"}],
                "geometries":[{"date":"2024-06-01T00:00:00Z","coordinates":[-118.5,34.2]}]}]}"#,
        )
        .unwrap()
    }

    fn ready_controller() -> (MapController<FakeBackend>, FakeBackend) {
        let backend = FakeBackend::default();
        let mut controller = MapController::new(backend.clone());
        controller.mount(&MapOptions::with_pixel_ratio(1.0)).unwrap();
        (controller, backend)
    }

    #[test]
    fn mount_builds_widget_once() {
        let (mut controller, backend) = ready_controller();
        assert!(controller.is_ready());
        assert_eq!(controller.mount(&MapOptions::with_pixel_ratio(2.0)), Ok(false));
        assert_eq!(controller.mount(&MapOptions::with_pixel_ratio(2.0)), Ok(false));

        let log = backend.log.borrow();
        assert_eq!(log.maps_created, 1);
        assert_eq!(log.resize_listeners, 1);
    }

    #[test]
    fn failed_mount_stays_uninitialized() {
        let backend = FakeBackend::default();
        backend.log.borrow_mut().fail_create = true;
        let mut controller = MapController::new(backend.clone());

        let err = controller
            .mount(&MapOptions::with_pixel_ratio(1.0))
            .unwrap_err();
        assert!(matches!(err, MapError::Sdk(_)));
        assert!(!controller.is_ready());
        assert_eq!(backend.log.borrow().resize_listeners, 0);
    }

    #[test]
    fn sync_before_mount_is_rejected() {
        let mut controller = MapController::new(FakeBackend::default());
        assert_eq!(controller.sync(&fires(2)), Err(MapError::NotMounted));
    }

    #[test]
    fn marker_placed_at_swapped_coordinates() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&canyon_fire()).unwrap();

        let log = backend.log.borrow();
        assert_eq!(
            log.marker_positions,
            vec![(
                LatLng {
                    lat: 34.2,
                    lng: -118.5
                },
                0
            )]
        );
    }

    #[test]
    fn sync_replaces_markers_wholesale() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&fires(3)).unwrap();
        assert_eq!(controller.marker_count(), 3);

        controller.sync(&fires(1)).unwrap();
        assert_eq!(controller.marker_count(), 1);
        assert_eq!(backend.log.borrow().live_markers.len(), 1);

        controller.sync(&[]).unwrap();
        assert_eq!(controller.marker_count(), 0);
        assert!(backend.log.borrow().live_markers.is_empty());
        assert_eq!(backend.log.borrow().maps_created, 1);
    }

    #[test]
    fn tap_selects_event_and_opens_bubble() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&canyon_fire()).unwrap();

        let selected = controller.tap(0).unwrap().unwrap();
        assert_eq!(selected.title, "Canyon Fire");

        let log = backend.log.borrow();
        assert_eq!(log.open_bubbles.len(), 1);
        assert!(log.open_bubbles[0].contains("Canyon Fire"));
        assert!(log.open_bubbles[0].contains("Started: 6/1/2024"));
        assert_eq!(log.live_styles.len(), 1);
    }

    #[test]
    fn tap_replaces_previous_bubble_and_style() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&fires(2)).unwrap();

        controller.tap(0).unwrap();
        let selected = controller.tap(1).unwrap().unwrap();
        assert_eq!(selected.title, "Fire 1");

        let log = backend.log.borrow();
        assert_eq!(log.open_bubbles.len(), 1);
        assert!(log.open_bubbles[0].contains("Fire 1"));
        assert_eq!(log.live_styles.len(), 1);
    }

    #[test]
    fn tap_on_unknown_index_is_ignored() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&fires(1)).unwrap();
        assert_eq!(controller.tap(7), Ok(None));
        assert!(backend.log.borrow().open_bubbles.is_empty());
    }

    #[test]
    fn style_released_when_user_closes_bubble_then_dispose_is_harmless() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&fires(1)).unwrap();
        controller.tap(0).unwrap();

        let style = *backend.log.borrow().live_styles.iter().next().unwrap();
        backend.user_closes_bubble(style);
        assert!(backend.log.borrow().live_styles.is_empty());

        controller.dispose();
        assert!(backend.log.borrow().live_styles.is_empty());
    }

    #[test]
    fn dispose_releases_everything_with_bubble_open() {
        let (mut controller, backend) = ready_controller();
        controller.sync(&fires(4)).unwrap();
        controller.tap(2).unwrap();

        controller.dispose();
        assert!(controller.is_disposed());
        assert_eq!(controller.marker_count(), 0);

        let log = backend.log.borrow();
        assert_eq!(log.resize_listeners, 0);
        assert_eq!(log.maps_disposed, 1);
        assert!(log.live_markers.is_empty());
        assert!(log.live_styles.is_empty());
        assert!(log.open_bubbles.is_empty());
    }

    #[test]
    fn dispose_is_idempotent() {
        let (mut controller, backend) = ready_controller();
        controller.dispose();
        controller.dispose();
        assert_eq!(backend.log.borrow().maps_disposed, 1);
        assert_eq!(backend.log.borrow().resize_listeners, 0);
    }

    #[test]
    fn dispose_before_mount_keeps_controller_mountable() {
        let backend = FakeBackend::default();
        let mut controller = MapController::new(backend.clone());
        controller.dispose();
        assert!(!controller.is_disposed());
        assert_eq!(backend.log.borrow().maps_disposed, 0);
    }

    #[test]
    fn disposed_controller_can_mount_fresh_widget() {
        let (mut controller, backend) = ready_controller();
        controller.dispose();
        assert_eq!(controller.tap(0), Err(MapError::NotMounted));

        assert_eq!(
            controller.mount(&MapOptions::with_pixel_ratio(1.0)),
            Ok(true)
        );
        assert_eq!(backend.log.borrow().maps_created, 2);
        assert_eq!(backend.log.borrow().resize_listeners, 1);
    }

    #[test]
    fn options_fall_back_to_unit_pixel_ratio() {
        let options = MapOptions::with_pixel_ratio(0.0);
        assert_eq!(options.pixel_ratio, 1.0);
        assert_eq!(options.zoom, 2.0);
        assert_eq!(options.center, LatLng { lat: 0.0, lng: 0.0 });
    }
}
