//! Car configurator core: the scene manager that owns the render surface and
//! scene graph, the session that loads assets and reacts to selections, and
//! the view model the UI draws from.

use thiserror::Error;

pub mod scene_manager;
pub mod session;
pub mod view;

pub use scene_manager::{SceneManager, WheelSet};
pub use session::{ConfiguratorSession, LoadState, SelectionState};
pub use view::{ColorButton, ConfiguratorView, FailedAsset, ReadyView, UiAction, WheelButton};

/// A selection naming something the registry does not offer. The UI builds
/// its buttons from the registry, so reaching this is a wiring bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnknownSelectionError {
    #[error("unknown wheel style '{0}'")]
    Wheel(String),
    #[error("unknown colour '{0}'")]
    Color(String),
    #[error("wheel style '{0}' has not loaded")]
    NotLoaded(String),
}

#[cfg(test)]
pub(crate) mod testing {
    use asset::{AssetEntry, AssetRegistry, AssetTable, MemorySource, Palette};
    use corelib::{Color, PlacementOptions};
    use renderer::{FrameInput, RenderError, RenderSurface};

    /// Render surface that records what it was asked to do.
    #[derive(Default)]
    pub struct RecordingSurface {
        pub renders: usize,
        pub resizes: Vec<(u32, u32)>,
        pub last_object_count: usize,
    }

    impl RenderSurface for RecordingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError> {
            self.renders += 1;
            self.last_object_count = frame.scene.len();
            Ok(())
        }
    }

    pub const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    pub const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

    /// audi body; vossen (default) and enkei wheels; palette incl. "red".
    pub fn registry() -> AssetRegistry {
        let slot = |n: usize, x: f32, z: f32, ry: f32| {
            PlacementOptions::new(
                format!("wheel_{n}"),
                Color::from_hex(0x8a8d8f),
                [x, 40.0, z],
                [0.0, ry, 0.0],
            )
        };
        AssetRegistry {
            bodies: AssetTable::new(vec![AssetEntry::new("audi", "cars/audi.obj")], "audi"),
            wheels: AssetTable::new(
                vec![
                    AssetEntry::new("vossen", "wheels/vossen.obj"),
                    AssetEntry::new("enkei", "wheels/enkei.obj"),
                ],
                "vossen",
            ),
            default_options: PlacementOptions::new(
                "model",
                Color::from_hex(0x2b2b2b),
                [0.0; 3],
                [0.0; 3],
            ),
            slot_options: [
                slot(1, 170.0, 80.0, 0.0),
                slot(2, 170.0, -80.0, 3.0),
                slot(3, -120.0, 80.0, 0.0),
                slot(4, -120.0, -80.0, 3.0),
            ],
            palette: Palette::new(vec![
                ("silver".into(), Color::from_hex(0x8a8d8f)),
                ("red".into(), Color::from_hex(0xff0000)),
            ]),
            default_color: "silver".into(),
            clear_color: Color::from_hex(0xf2f2f2),
        }
    }

    pub fn source() -> MemorySource {
        MemorySource::new()
            .with("cars/audi.obj", QUAD)
            .with("wheels/vossen.obj", TRIANGLE)
            .with("wheels/enkei.obj", QUAD)
    }
}
