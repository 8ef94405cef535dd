//! Scene Manager: owns the render surface, scene graph, camera, lights and
//! orbit controls. Every mutation is explicit; nothing redraws implicitly
//! except resize and a camera move, which each redraw exactly once.

use asset::{ModelLibrary, WheelSlot};
use corelib::{
    Camera, Color, CoreResult, NodeId, Object3d, PlacementOptions, SceneGraph, light::LightRig,
    orbit::OrbitControls,
};
use renderer::{FrameInput, RenderSurface};

/// Handles of the four mounted wheels, in [`WheelSlot::ALL`] order.
/// Returned by [`SceneManager::mount_wheel_set`] and consumed by
/// [`SceneManager::unmount_wheel_set`], so a set cannot be removed twice.
#[derive(Debug, PartialEq, Eq)]
pub struct WheelSet {
    nodes: [NodeId; 4],
}

impl WheelSet {
    pub fn node(&self, slot: WheelSlot) -> NodeId {
        self.nodes[slot as usize]
    }

    pub fn nodes(&self) -> &[NodeId; 4] {
        &self.nodes
    }
}

pub struct SceneManager<S> {
    surface: S,
    scene: SceneGraph,
    camera: Camera,
    lights: LightRig,
    controls: OrbitControls,
    viewport: (u32, u32),
    clear_color: Color,
    redraws: u64,
}

impl<S: RenderSurface> SceneManager<S> {
    /// Showroom camera and lights, turntable controls, empty scene.
    pub fn bootstrap(surface: S, width: u32, height: u32, clear_color: Color) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        log::info!("Scene bootstrap: viewport {}x{}", width, height);
        Self {
            surface,
            scene: SceneGraph::new(),
            camera: Camera::showroom(width, height),
            lights: LightRig::showroom(),
            controls: OrbitControls::turntable(),
            viewport: (width, height),
            clear_color,
            redraws: 0,
        }
    }

    pub fn attach(&mut self, object: Object3d) -> NodeId {
        log::debug!("Attach '{}'", object.name);
        self.scene.attach(object)
    }

    pub fn detach(&mut self, node: NodeId) -> Option<Object3d> {
        self.scene.detach(node)
    }

    pub fn apply_placement(&mut self, node: NodeId, opts: &PlacementOptions) -> CoreResult<()> {
        self.scene.apply_placement(node, opts)
    }

    /// Clone `base` into every slot, place each clone with its slot's
    /// options and attach all four.
    pub fn mount_wheel_set(&mut self, base: &Object3d, slots: &[PlacementOptions; 4]) -> WheelSet {
        let nodes = WheelSlot::ALL.map(|slot| {
            let mut wheel = base.clone();
            wheel.apply_placement(&slots[slot as usize]);
            self.scene.attach(wheel)
        });
        log::debug!("Mounted wheel set (mesh {:?})", base.mesh);
        WheelSet { nodes }
    }

    /// Detach the four wheels and return them in slot order.
    pub fn unmount_wheel_set(&mut self, set: WheelSet) -> Vec<Object3d> {
        set.nodes
            .into_iter()
            .filter_map(|node| {
                let wheel = self.scene.detach(node);
                if wheel.is_none() {
                    log::warn!("Wheel node {:?} was already detached", node);
                }
                wheel
            })
            .collect()
    }

    pub fn resize(&mut self, width: u32, height: u32, meshes: &ModelLibrary) {
        self.set_viewport(width, height);
        self.redraw(meshes);
    }

    /// Resize without drawing, for hosts that draw the next frame themselves.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        log::info!("Viewport: {}x{}", width, height);
        self.viewport = (width, height);
        self.camera.set_viewport(width, height);
        self.surface.resize(width, height);
    }

    /// Pointer drag in pixels; redraws when the view changed.
    pub fn orbit(&mut self, dx: f32, dy: f32, meshes: &ModelLibrary) -> bool {
        let changed = self
            .controls
            .rotate(&mut self.camera, dx, dy, self.viewport.1 as f32);
        if changed {
            self.redraw(meshes);
        }
        changed
    }

    /// Mouse-wheel dolly; a no-op while zoom is disabled.
    pub fn zoom(&mut self, steps: f32, meshes: &ModelLibrary) -> bool {
        let changed = self.controls.zoom(&mut self.camera, steps);
        if changed {
            self.redraw(meshes);
        }
        changed
    }

    /// Pan drag in pixels; a no-op while panning is disabled.
    pub fn pan(&mut self, dx: f32, dy: f32, meshes: &ModelLibrary) -> bool {
        let height = self.viewport.1 as f32;
        let changed = self.controls.pan(&mut self.camera, dx, dy, height);
        if changed {
            self.redraw(meshes);
        }
        changed
    }

    /// Draw the current scene from the current camera.
    pub fn redraw(&mut self, meshes: &ModelLibrary) {
        let frame = FrameInput {
            scene: &self.scene,
            camera: &self.camera,
            lights: &self.lights,
            meshes,
            clear_color: self.clear_color,
        };
        match self.surface.render(&frame) {
            Ok(()) => self.redraws += 1,
            Err(err) => log::error!("Redraw failed: {}", err),
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSurface, registry};
    use corelib::{Material, MeshId};

    fn manager() -> SceneManager<RecordingSurface> {
        SceneManager::bootstrap(RecordingSurface::default(), 1280, 720, Color::WHITE)
    }

    fn base_wheel() -> Object3d {
        Object3d::new("model", MeshId(3), Material::flat(Color::from_hex(0x2b2b2b)))
    }

    #[test]
    fn bootstrap_builds_showroom() {
        let sm = manager();
        assert!(sm.scene().is_empty());
        assert_eq!(sm.camera().fov_y_deg, 20.0);
        assert_eq!(sm.lights().points.len(), 4);
        assert_eq!(sm.controls().rotate_speed, 0.5);
        assert!(!sm.controls().enable_pan && !sm.controls().enable_zoom);
        assert_eq!(sm.redraw_count(), 0);
    }

    #[test]
    fn mount_places_four_named_clones() {
        let mut sm = manager();
        let slots = registry().slot_options;
        let set = sm.mount_wheel_set(&base_wheel(), &slots);
        assert_eq!(sm.scene().len(), 4);
        for slot in WheelSlot::ALL {
            let wheel = sm.scene().get(set.node(slot)).unwrap();
            let opts = &slots[slot as usize];
            assert_eq!(wheel.name, slot.node_name());
            assert_eq!(wheel.mesh, MeshId(3));
            assert_eq!(wheel.material.color, opts.color);
            assert_eq!(wheel.transform.position, opts.position);
            assert_eq!(wheel.transform.rotation, opts.rotation);
        }
    }

    #[test]
    fn unmount_detaches_all_four() {
        let mut sm = manager();
        let slots = registry().slot_options;
        let set = sm.mount_wheel_set(&base_wheel(), &slots);
        let nodes = *set.nodes();
        let wheels = sm.unmount_wheel_set(set);
        assert_eq!(wheels.len(), 4);
        assert_eq!(wheels[0].name, "wheel_1");
        assert!(sm.scene().is_empty());
        assert!(nodes.iter().all(|n| !sm.scene().contains(*n)));
    }

    #[test]
    fn resize_updates_aspect_and_redraws_once() {
        let mut sm = manager();
        let body = sm.attach(base_wheel());
        let lib = ModelLibrary::new();
        sm.resize(1000, 500, &lib);
        assert_eq!(sm.camera().aspect, 2.0);
        assert_eq!(sm.redraw_count(), 1);
        assert_eq!(sm.surface().renders, 1);
        assert_eq!(sm.surface().resizes, vec![(1000, 500)]);
        assert_eq!(sm.scene().len(), 1);
        assert!(sm.scene().contains(body));
    }

    #[test]
    fn redraw_is_repeatable() {
        let mut sm = manager();
        let lib = ModelLibrary::new();
        sm.attach(base_wheel());
        sm.redraw(&lib);
        sm.redraw(&lib);
        assert_eq!(sm.surface().renders, 2);
        assert_eq!(sm.surface().last_object_count, 1);
        assert_eq!(sm.scene().len(), 1);
    }

    #[test]
    fn orbit_drag_redraws_only_when_view_changes() {
        let mut sm = manager();
        let lib = ModelLibrary::new();
        assert!(!sm.orbit(0.0, 0.0, &lib));
        assert_eq!(sm.redraw_count(), 0);
        assert!(sm.orbit(25.0, 5.0, &lib));
        assert_eq!(sm.redraw_count(), 1);
    }

    #[test]
    fn set_viewport_resizes_without_drawing() {
        let mut sm = manager();
        sm.set_viewport(0, 300);
        assert_eq!(sm.viewport(), (1, 300));
        assert_eq!(sm.surface().resizes, vec![(1, 300)]);
        assert_eq!(sm.redraw_count(), 0);
    }

    #[test]
    fn turntable_wheel_and_pan_input_is_ignored() {
        let mut sm = manager();
        let lib = ModelLibrary::new();
        let eye = sm.camera().eye;
        assert!(!sm.zoom(2.0, &lib));
        assert!(!sm.pan(30.0, 12.0, &lib));
        assert_eq!(sm.camera().eye, eye);
        assert_eq!(sm.redraw_count(), 0);
    }

    #[test]
    fn apply_placement_on_detached_node_fails() {
        let mut sm = manager();
        let node = sm.attach(base_wheel());
        sm.detach(node);
        let opts = &registry().slot_options[0];
        assert!(sm.apply_placement(node, opts).is_err());
    }
}
