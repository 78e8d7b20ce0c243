//! Provides a three-point angle measurement for the Egui library.
//!
//! # Usage
//!
//! Create a new `AngleSession` instance once. The [`MeasureOverlay`] sink
//! keeps the latest outputs so that they can be painted every frame.
//!
//! ```
//! use measure_gizmo_egui::prelude::*;
//!
//! let session = AngleSession::<MeasureOverlay>::default();
//! ```
//!
//! Update the configuration as needed, for example, when the camera moves.
//!
//! ```ignore
//! session.update_config(MeasureConfig {
//!     view_matrix: view_matrix.into(),
//!     projection_matrix: projection_matrix.into(),
//!     ..*session.config()
//! });
//! ```
//!
//! Finally, interact with the measurement. Clicks pick points from the given surface,
//! and the result is [`Some`] once all three points have been picked.
//!
//! ```ignore
//! if let Some(result) = session.interact(ui, &surface) {
//!     ui.label(format!("{:.1}°", result.angle_degrees));
//! }
//! session.clear_button(ui);
//! ```
use egui::{
    epaint::Vertex, Align2, FontId, Mesh, PointerButton, Response, Rgba, Sense, Ui,
};
use tracing::debug;

pub use measure_gizmo::*;
pub mod prelude;

pub trait MeasureExt {
    /// Interact with the measurement and draw it to Ui.
    ///
    /// Returns the measured angle once three points have been picked.
    fn interact(&mut self, ui: &Ui, surface: &impl PickSurface) -> Option<AngleResult>;

    /// Show a button that clears the measurement.
    fn clear_button(&mut self, ui: &mut Ui) -> Response;
}

impl MeasureExt for AngleSession<MeasureOverlay> {
    fn interact(&mut self, ui: &Ui, surface: &impl PickSurface) -> Option<AngleResult> {
        let mut viewport = self.config().viewport;
        if !viewport.is_finite() {
            viewport = ui.clip_rect();
        }

        self.update_config(MeasureConfig {
            viewport,
            pixels_per_point: ui.ctx().pixels_per_point(),
            ..*self.config()
        });

        let cursor_pos = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_default();

        let interaction = ui.interact(viewport, ui.id().with("_measure"), Sense::click());
        let pressed = interaction.hovered()
            && ui.input(|input| input.pointer.button_pressed(PointerButton::Primary));

        let was_resolved = self.state() == MeasureState::Resolved;

        let result = self
            .update(
                MeasureInteraction {
                    cursor_pos: (cursor_pos.x, cursor_pos.y),
                    pressed,
                    clear: false,
                },
                surface,
            )
            .cloned();

        if let Some(result) = result.as_ref().filter(|_| !was_resolved) {
            debug!(angle = result.angle_degrees, "Angle measured");
        }

        paint(ui, viewport, self.sinks().draw(self.config()));

        result
    }

    fn clear_button(&mut self, ui: &mut Ui) -> Response {
        let response = ui.add_enabled(
            self.state() != MeasureState::Empty,
            egui::Button::new("Clear measurement"),
        );
        if response.clicked() {
            self.clear();
        }
        response
    }
}

fn paint(ui: &Ui, viewport: Rect, draw_data: MeasureDrawData) {
    let painter = egui::Painter::new(ui.ctx().clone(), ui.layer_id(), viewport);

    painter.add(Mesh {
        indices: draw_data.indices,
        vertices: draw_data
            .vertices
            .into_iter()
            .zip(draw_data.colors)
            .map(|(pos, [r, g, b, a])| Vertex {
                pos: pos.into(),
                uv: Pos2::default(),
                color: Rgba::from_rgba_premultiplied(r, g, b, a).into(),
            })
            .collect(),
        ..Default::default()
    });

    if let Some(label) = draw_data.label {
        let [r, g, b, a] = label.color;
        painter.text(
            label.pos.into(),
            Align2::CENTER_CENTER,
            label.text,
            FontId::proportional(label.size),
            Rgba::from_rgba_premultiplied(r, g, b, a).into(),
        );
    }
}
