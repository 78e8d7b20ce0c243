use eframe::{egui, NativeOptions};
use measure_gizmo_egui::math::{DMat4, DQuat, DVec3, DVec4};
use measure_gizmo_egui::prelude::*;
use tracing_subscriber::EnvFilter;

struct ExampleApp {
    session: AngleSession<MeasureOverlay>,
    surface: TriangleSurface,

    yaw: f64,
    live_tracking: bool,
    arc_segments: u32,
}

impl ExampleApp {
    fn new() -> Self {
        Self {
            session: AngleSession::default(),
            surface: TriangleSurface::cuboid(DVec3::new(1.0, 0.75, 0.5)),
            yaw: 0.0,
            live_tracking: true,
            arc_segments: 32,
        }
    }

    fn draw_measurement(&mut self, ui: &mut egui::Ui) {
        // The whole clipping area of the UI is used as viewport
        let viewport = ui.clip_rect();

        let projection_matrix = DMat4::perspective_rh(
            std::f64::consts::PI / 4.0,
            (viewport.width() / viewport.height()).into(),
            0.1,
            100.0,
        );

        // Fixed camera position
        let view_matrix = DMat4::look_at_rh(DVec3::new(3.0, 2.5, 4.0), DVec3::ZERO, DVec3::Y);

        self.surface.transform = DMat4::from_quat(DQuat::from_rotation_y(self.yaw));

        self.session.update_config(MeasureConfig {
            view_matrix: view_matrix.into(),
            projection_matrix: projection_matrix.into(),
            viewport,
            live_tracking: self.live_tracking,
            arc_segments: self.arc_segments,
            pixels_per_point: ui.ctx().pixels_per_point(),
            ..*self.session.config()
        });

        draw_wireframe(ui, &self.surface, projection_matrix * view_matrix, viewport);

        if let Some(result) = self.session.interact(ui, &self.surface) {
            tracing::trace!("{result:?}");
        }
    }

    fn draw_options(&mut self, ui: &mut egui::Ui) {
        ui.heading("Options");
        ui.separator();

        egui::Grid::new("options_grid")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Model yaw");
                ui.add(egui::Slider::new(&mut self.yaw, -std::f64::consts::PI..=std::f64::consts::PI));
                ui.end_row();

                ui.label("Arc segments");
                ui.add(egui::Slider::new(&mut self.arc_segments, 4..=128));
                ui.end_row();

                ui.label("Live tracking");
                ui.checkbox(&mut self.live_tracking, "");
                ui.end_row();
            });

        ui.separator();

        match self.session.result() {
            Some(result) => ui.label(format!("Angle: {:.2}°", result.angle_degrees)),
            None => ui.label(format!("Picked {} of 3 points", self.session.points().len())),
        };

        self.session.clear_button(ui);
    }
}

impl eframe::App for ExampleApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        egui::SidePanel::left("options_panel").show(ctx, |ui| {
            self.draw_options(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_measurement(ui);
        });

        ctx.request_repaint();
    }
}

fn draw_wireframe(ui: &egui::Ui, surface: &TriangleSurface, view_projection: DMat4, viewport: Rect) {
    let mvp = view_projection * surface.transform;
    let project = |pos: DVec3| {
        let clip = mvp * DVec4::from((pos, 1.0));
        (clip.w > 1e-10).then(|| {
            let ndc = clip / clip.w;
            egui::pos2(
                viewport.center().x + (ndc.x as f32) * viewport.width() / 2.0,
                viewport.center().y - (ndc.y as f32) * viewport.height() / 2.0,
            )
        })
    };

    let stroke = egui::Stroke::new(1.0, egui::Color32::GRAY);
    let painter = ui.painter_at(viewport);
    for triangle in surface.indices.chunks_exact(3) {
        for (from, to) in [(0, 1), (1, 2), (2, 0)] {
            let from = project(surface.vertices[triangle[from] as usize]);
            let to = project(surface.vertices[triangle[to] as usize]);
            if let Some((from, to)) = from.zip(to) {
                painter.line_segment([from, to], stroke);
            }
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    eframe::run_native(
        "measure_gizmo_egui example",
        NativeOptions::default(),
        Box::new(|_| Ok(Box::new(ExampleApp::new()))),
    )
}
