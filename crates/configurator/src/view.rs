//! Configurator View: what the UI shows, derived from a session on every
//! frame. The UI never mutates the session directly; it returns
//! [`UiAction`]s that the host feeds to [`ConfiguratorSession::handle`].

use corelib::Color;
use renderer::RenderSurface;

use crate::{ConfiguratorSession, LoadState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    SelectWheel(String),
    SelectColor(String),
    Retry(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WheelButton {
    pub id: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorButton {
    pub id: String,
    pub color: Color,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedAsset {
    pub logical_name: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadyView {
    pub wheel_buttons: Vec<WheelButton>,
    pub color_buttons: Vec<ColorButton>,
    pub failed: Vec<FailedAsset>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfiguratorView {
    Loading { failed: Vec<FailedAsset> },
    Ready(ReadyView),
}

impl ConfiguratorView {
    /// "Loading" until the session is ready and at least one model exists.
    /// Buttons for the current choice are disabled, and so are wheel styles
    /// whose model failed to load.
    pub fn of<S: RenderSurface>(session: &ConfiguratorSession<S>) -> Self {
        let failed: Vec<FailedAsset> = session
            .failures()
            .map(|(name, err)| FailedAsset {
                logical_name: name.to_string(),
                reason: err.to_string(),
            })
            .collect();

        if session.state() != LoadState::Ready || session.library().is_empty() {
            return Self::Loading { failed };
        }

        let selection = session.selection();
        let wheel_buttons = session
            .registry()
            .wheels
            .names()
            .map(|id| WheelButton {
                id: id.to_string(),
                enabled: id != selection.current_wheel_id && session.library().contains_model(id),
            })
            .collect();
        let color_buttons = session
            .registry()
            .palette()
            .iter()
            .map(|(id, color)| ColorButton {
                id: id.to_string(),
                color,
                enabled: id != selection.current_color_id,
            })
            .collect();

        Self::Ready(ReadyView {
            wheel_buttons,
            color_buttons,
            failed,
        })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn failed(&self) -> &[FailedAsset] {
        match self {
            Self::Loading { failed } => failed,
            Self::Ready(ready) => &ready.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, registry, source};

    fn session() -> ConfiguratorSession<RecordingSurface> {
        ConfiguratorSession::new(registry(), RecordingSurface::default(), 640, 480).unwrap()
    }

    #[test]
    fn loading_before_start() {
        let view = ConfiguratorView::of(&session());
        assert!(view.is_loading());
        assert!(view.failed().is_empty());
    }

    #[test]
    fn ready_view_disables_current_choices() {
        let mut session = session();
        let loader = session.loader(source());
        pollster::block_on(session.start(&loader));

        let ConfiguratorView::Ready(ready) = ConfiguratorView::of(&session) else {
            panic!("expected ready view");
        };
        assert_eq!(
            ready.wheel_buttons,
            vec![
                WheelButton {
                    id: "vossen".into(),
                    enabled: false,
                },
                WheelButton {
                    id: "enkei".into(),
                    enabled: true,
                },
            ]
        );
        let enabled: Vec<_> = ready
            .color_buttons
            .iter()
            .map(|b| (b.id.as_str(), b.enabled))
            .collect();
        assert_eq!(enabled, [("silver", false), ("red", true)]);
    }

    #[test]
    fn selection_moves_the_disabled_button() {
        let mut session = session();
        let loader = session.loader(source());
        pollster::block_on(session.start(&loader));
        let action = UiAction::SelectColor("red".into());
        pollster::block_on(session.handle(action, &loader)).unwrap();

        let ConfiguratorView::Ready(ready) = ConfiguratorView::of(&session) else {
            panic!("expected ready view");
        };
        let red = ready.color_buttons.iter().find(|b| b.id == "red").unwrap();
        assert!(!red.enabled);
        assert_eq!(red.color.hex(), 0xff0000);
    }

    #[test]
    fn switching_style_swaps_enabled_wheel_buttons() {
        let mut session = session();
        let loader = session.loader(source());
        pollster::block_on(session.start(&loader));
        let action = UiAction::SelectWheel("enkei".into());
        pollster::block_on(session.handle(action, &loader)).unwrap();

        let ConfiguratorView::Ready(ready) = ConfiguratorView::of(&session) else {
            panic!("expected ready view");
        };
        let enabled: Vec<_> = ready
            .wheel_buttons
            .iter()
            .map(|b| (b.id.as_str(), b.enabled))
            .collect();
        assert_eq!(enabled, [("vossen", true), ("enkei", false)]);
    }

    #[test]
    fn failed_wheel_is_listed_and_disabled() {
        let mut session = session();
        let mut partial = source();
        partial.remove("wheels/enkei.obj");
        let loader = session.loader(partial);
        pollster::block_on(session.start(&loader));

        let view = ConfiguratorView::of(&session);
        assert_eq!(view.failed().len(), 1);
        assert_eq!(view.failed()[0].logical_name, "enkei");
        let ConfiguratorView::Ready(ready) = view else {
            panic!("expected ready view");
        };
        assert!(ready.wheel_buttons.iter().all(|b| !b.enabled));
    }

    #[test]
    fn nothing_loaded_stays_loading() {
        let mut session = session();
        let loader = session.loader(asset::MemorySource::new());
        pollster::block_on(session.start(&loader));
        let view = ConfiguratorView::of(&session);
        assert!(view.is_loading());
        assert_eq!(view.failed().len(), 3);
    }
}
