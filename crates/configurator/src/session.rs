//! Configurator Controller. A [`ConfiguratorSession`] is owned by the caller
//! and holds everything one configurator instance needs: scene, registry,
//! loaded models, the live slot options, selection and load failures.

use std::collections::BTreeMap;

use asset::{
    AssetCategory, AssetEntry, AssetLoadError, AssetRegistry, AssetSource, ModelLibrary,
    ModelLoader, PostLoad, RegistryError, Teardown, WheelSlot,
};
use corelib::{NodeId, Object3d, PlacementOptions};
use renderer::RenderSurface;

use crate::{SceneManager, UnknownSelectionError, WheelSet, view::UiAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    TornDown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
    pub current_color_id: String,
    pub current_wheel_id: String,
}

pub struct ConfiguratorSession<S> {
    scene: SceneManager<S>,
    registry: AssetRegistry,
    library: ModelLibrary,
    /// Live per-slot options; colour changes are written here and snapshot
    /// into each new wheel set.
    slot_options: [PlacementOptions; 4],
    wheel_set: Option<WheelSet>,
    body: Option<NodeId>,
    selection: SelectionState,
    failures: BTreeMap<String, AssetLoadError>,
    state: LoadState,
    teardown: Teardown,
}

impl<S: RenderSurface> ConfiguratorSession<S> {
    pub fn new(
        registry: AssetRegistry,
        surface: S,
        width: u32,
        height: u32,
    ) -> Result<Self, RegistryError> {
        registry.validate()?;
        let scene = SceneManager::bootstrap(surface, width, height, registry.clear_color);
        let selection = SelectionState {
            current_color_id: registry.default_color.clone(),
            current_wheel_id: registry.wheels.default.clone(),
        };
        // validate() guarantees the default colour is in the palette.
        let default_color = registry.palette().get(&registry.default_color);
        let slot_options = WheelSlot::ALL.map(|slot| {
            let mut opts = registry.wheel_slot_options(slot).clone();
            if let Some(color) = default_color {
                opts.color = color;
            }
            opts
        });
        Ok(Self {
            scene,
            slot_options,
            registry,
            library: ModelLibrary::new(),
            wheel_set: None,
            body: None,
            selection,
            failures: BTreeMap::new(),
            state: LoadState::Uninitialized,
            teardown: Teardown::new(),
        })
    }

    /// A loader whose loads are abandoned when this session tears down.
    pub fn loader<Src: AssetSource>(&self, source: Src) -> ModelLoader<Src> {
        ModelLoader::new(source, self.teardown.clone())
    }

    /// Handle that can tear the session down while a load is in flight.
    pub fn teardown_handle(&self) -> Teardown {
        self.teardown.clone()
    }

    /// Load every body, then every wheel style, one at a time; show each
    /// category's default as soon as it arrives.
    pub async fn start<Src: AssetSource>(&mut self, loader: &ModelLoader<Src>) {
        if self.state != LoadState::Uninitialized {
            log::warn!("Session already started ({:?})", self.state);
            return;
        }
        self.state = LoadState::Loading;
        for category in AssetCategory::ALL {
            self.load_one_type_models(category, loader).await;
            if self.teardown.is_triggered() {
                self.state = LoadState::TornDown;
                return;
            }
        }
        self.state = LoadState::Ready;
        log::info!(
            "Configurator ready: {} model(s), {} failure(s)",
            self.library.model_count(),
            self.failures.len()
        );
        self.redraw();
    }

    async fn load_one_type_models<Src: AssetSource>(
        &mut self,
        category: AssetCategory,
        loader: &ModelLoader<Src>,
    ) {
        let entries = self.registry.table(category).entries.clone();
        log::info!("Loading {} {} model(s)", entries.len(), category.label());
        for entry in &entries {
            let loaded = self.load_entry(category, entry, loader).await;
            if !loaded && self.teardown.is_triggered() {
                return;
            }
        }
    }

    /// Load one entry; show it if it is what its category should display.
    /// Returns whether the model loaded.
    async fn load_entry<Src: AssetSource>(
        &mut self,
        category: AssetCategory,
        entry: &AssetEntry,
        loader: &ModelLoader<Src>,
    ) -> bool {
        let name = entry.logical_name.as_str();
        match loader
            .load_model(&mut self.library, entry, self.registry.default_options())
            .await
        {
            Ok(object) => {
                self.failures.remove(name);
                if self.wants_displayed(category, name) {
                    self.show(category, &object);
                }
                true
            }
            Err(err) if err.is_cancelled() => {
                log::info!("{}", err);
                false
            }
            Err(err) => {
                log::warn!("{}", err);
                self.failures.insert(name.to_string(), err);
                false
            }
        }
    }

    fn wants_displayed(&self, category: AssetCategory, name: &str) -> bool {
        match category {
            AssetCategory::Body => self.body.is_none() && name == self.registry.bodies.default,
            AssetCategory::WheelSet => {
                self.wheel_set.is_none() && name == self.selection.current_wheel_id
            }
        }
    }

    fn show(&mut self, category: AssetCategory, object: &Object3d) {
        match category.post_load() {
            PostLoad::AttachSingle => {
                if let Some(old) = self.body.take() {
                    self.scene.detach(old);
                }
                self.body = Some(self.scene.attach(object.clone()));
            }
            PostLoad::MountFour => {
                if let Some(old) = self.wheel_set.take() {
                    self.scene.unmount_wheel_set(old);
                }
                self.wheel_set = Some(self.scene.mount_wheel_set(object, &self.slot_options));
            }
        }
    }

    /// Repaint the four wheels with a palette colour. Position and rotation
    /// of every slot are untouched.
    pub fn on_select_color(&mut self, color_id: &str) -> Result<(), UnknownSelectionError> {
        let color = self
            .registry
            .palette
            .get(color_id)
            .ok_or_else(|| UnknownSelectionError::Color(color_id.to_string()))?;
        for opts in &mut self.slot_options {
            opts.color = color;
        }
        if let Some(set) = self.wheel_set.take() {
            let recovered = self.scene.unmount_wheel_set(set);
            if let Some(first) = recovered.first() {
                self.wheel_set = Some(self.scene.mount_wheel_set(first, &self.slot_options));
            }
        }
        self.redraw();
        log::info!("Colour -> {} ({})", color_id, color);
        self.selection.current_color_id = color_id.to_string();
        Ok(())
    }

    /// Replace the mounted wheels with clones of another style.
    pub fn on_select_wheel_style(
        &mut self,
        logical_name: &str,
    ) -> Result<(), UnknownSelectionError> {
        if self.registry.wheels.get(logical_name).is_none() {
            return Err(UnknownSelectionError::Wheel(logical_name.to_string()));
        }
        let model = self
            .library
            .model(logical_name)
            .cloned()
            .ok_or_else(|| UnknownSelectionError::NotLoaded(logical_name.to_string()))?;
        if let Some(set) = self.wheel_set.take() {
            self.scene.unmount_wheel_set(set);
        }
        self.wheel_set = Some(self.scene.mount_wheel_set(&model, &self.slot_options));
        self.redraw();
        log::info!("Wheels -> {}", logical_name);
        self.selection.current_wheel_id = logical_name.to_string();
        Ok(())
    }

    /// Reload a failed asset. Returns whether it is loaded afterwards.
    pub async fn retry<Src: AssetSource>(
        &mut self,
        logical_name: &str,
        loader: &ModelLoader<Src>,
    ) -> bool {
        if self.library.contains_model(logical_name) {
            return true;
        }
        let Some((category, entry)) = self
            .registry
            .find(logical_name)
            .map(|(c, e)| (c, e.clone()))
        else {
            log::error!("Retry of unknown asset '{}'", logical_name);
            return false;
        };
        let loaded = self.load_entry(category, &entry, loader).await;
        if loaded {
            self.redraw();
        }
        loaded
    }

    pub async fn handle<Src: AssetSource>(
        &mut self,
        action: UiAction,
        loader: &ModelLoader<Src>,
    ) -> Result<(), UnknownSelectionError> {
        if self.state == LoadState::TornDown {
            log::debug!("Ignoring {:?} after teardown", action);
            return Ok(());
        }
        match action {
            UiAction::SelectWheel(id) => self.on_select_wheel_style(&id),
            UiAction::SelectColor(id) => self.on_select_color(&id),
            UiAction::Retry(id) => {
                self.retry(&id, loader).await;
                Ok(())
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height, &self.library);
    }

    /// Resize the surface and camera only; the caller draws the next frame.
    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.scene.set_viewport(width, height);
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) -> bool {
        self.scene.orbit(dx, dy, &self.library)
    }

    pub fn zoom(&mut self, steps: f32) -> bool {
        self.scene.zoom(steps, &self.library)
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> bool {
        self.scene.pan(dx, dy, &self.library)
    }

    pub fn redraw(&mut self) {
        self.scene.redraw(&self.library);
    }

    /// Abandon outstanding loads; their completions are ignored.
    pub fn teardown(&mut self) {
        self.teardown.trigger();
        self.state = LoadState::TornDown;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn library(&self) -> &ModelLibrary {
        &self.library
    }

    pub fn scene(&self) -> &SceneManager<S> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneManager<S> {
        &mut self.scene
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    pub fn wheel_set(&self) -> Option<&WheelSet> {
        self.wheel_set.as_ref()
    }

    pub fn slot_options(&self) -> &[PlacementOptions; 4] {
        &self.slot_options
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AssetLoadError)> {
        self.failures.iter().map(|(name, err)| (name.as_str(), err))
    }
}
