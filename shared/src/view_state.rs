use crate::feed::{FeedError, WildfireEvent};

pub const FEED_ERROR_MESSAGE: &str = "Failed to fetch wildfire data";
pub const MAP_INIT_ERROR_MESSAGE: &str = "Failed to initialize map";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState<'a> {
    Error(&'a str),
    Loading,
    Content,
}

/// Data owned by the map view for one mount.
///
/// `loading` starts set and is released exactly once by [`ViewState::finish_load`],
/// whatever the outcome. Once an error is recorded it stays for the rest of the mount.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub wildfires: Vec<WildfireEvent>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            wildfires: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl ViewState {
    pub fn finish_load(&mut self, result: Result<Vec<WildfireEvent>, FeedError>) {
        match result {
            Ok(wildfires) => self.wildfires = wildfires,
            Err(_) => {
                self.wildfires.clear();
                self.set_error(FEED_ERROR_MESSAGE);
            }
        }
        self.loading = false;
    }

    pub fn fail_map_init(&mut self) {
        self.set_error(MAP_INIT_ERROR_MESSAGE);
    }

    fn set_error(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some(message.to_string());
        }
    }

    /// Error wins over Loading, Loading wins over Content.
    pub fn render_state(&self) -> RenderState<'_> {
        if let Some(message) = self.error.as_deref() {
            RenderState::Error(message)
        } else if self.loading {
            RenderState::Loading
        } else {
            RenderState::Content
        }
    }

    /// The map may only be built once data is in and nothing has failed.
    pub fn ready_for_map(&self) -> bool {
        self.render_state() == RenderState::Content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parse_feed;

    fn one_fire() -> Vec<WildfireEvent> {
        parse_feed(
            r#"{"events":[{"title":"Canyon Fire","categories":[{"title":"Wildfires"}],
                "geometries":[{"date":"2024-06-01T00:00:00Z","coordinates":[-118.5,34.2]}]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn starts_loading() {
        let state = ViewState::default();
        assert_eq!(state.render_state(), RenderState::Loading);
        assert!(!state.ready_for_map());
    }

    #[test]
    fn successful_load_shows_content() {
        let mut state = ViewState::default();
        state.finish_load(Ok(one_fire()));
        assert_eq!(state.render_state(), RenderState::Content);
        assert_eq!(state.wildfires.len(), 1);
        assert!(state.ready_for_map());
    }

    #[test]
    fn empty_load_is_content_not_error() {
        let mut state = ViewState::default();
        state.finish_load(Ok(Vec::new()));
        assert_eq!(state.render_state(), RenderState::Content);
        assert!(state.wildfires.is_empty());
    }

    #[test]
    fn failed_load_is_error_and_clears_loading() {
        let mut state = ViewState::default();
        state.finish_load(parse_feed("{oops"));
        assert!(!state.loading);
        assert!(state.wildfires.is_empty());
        assert_eq!(state.render_state(), RenderState::Error(FEED_ERROR_MESSAGE));
        assert!(!state.ready_for_map());
    }

    #[test]
    fn error_takes_priority_over_loading() {
        let mut state = ViewState::default();
        state.fail_map_init();
        assert!(state.loading);
        assert_eq!(
            state.render_state(),
            RenderState::Error(MAP_INIT_ERROR_MESSAGE)
        );
    }

    #[test]
    fn map_failure_after_content_is_terminal() {
        let mut state = ViewState::default();
        state.finish_load(Ok(one_fire()));
        state.fail_map_init();
        assert_eq!(
            state.render_state(),
            RenderState::Error(MAP_INIT_ERROR_MESSAGE)
        );
        state.finish_load(Ok(one_fire()));
        assert_eq!(
            state.render_state(),
            RenderState::Error(MAP_INIT_ERROR_MESSAGE)
        );
    }

    #[test]
    fn first_error_message_is_kept() {
        let mut state = ViewState::default();
        state.finish_load(parse_feed("[]"));
        state.fail_map_init();
        assert_eq!(state.error.as_deref(), Some(FEED_ERROR_MESSAGE));
    }
}
