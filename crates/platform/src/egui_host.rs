use egui_winit::winit::event::WindowEvent;
use renderer::OverlayFrame;
use winit::window::Window;

/// egui context plus its winit input state, one per window.
pub struct EguiHost {
    context: egui::Context,
    winit_state: egui_winit::State,
}

/// What egui made of one window event.
pub struct EguiEvent {
    pub consumed: bool,
    pub repaint: bool,
}

impl EguiHost {
    pub fn new(window: &Window) -> Self {
        let context = egui::Context::default();
        let winit_state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        Self {
            context,
            winit_state,
        }
    }

    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> EguiEvent {
        let response = self.winit_state.on_window_event(window, event);
        EguiEvent {
            consumed: response.consumed,
            repaint: response.repaint,
        }
    }

    /// Pointer is over a panel or a widget is being dragged.
    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input() || self.context.is_pointer_over_area()
    }

    /// Run one UI pass and tessellate it for the renderer's overlay.
    pub fn run_ui<F>(&mut self, window: &Window, run_ui: F) -> OverlayFrame
    where
        F: FnMut(&egui::Context),
    {
        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.context.run(raw_input, run_ui);
        self.winit_state
            .handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.context.tessellate(full_output.shapes, pixels_per_point);
        OverlayFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            pixels_per_point,
        }
    }
}
