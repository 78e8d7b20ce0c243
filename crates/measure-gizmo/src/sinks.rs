//! Outputs a measurement is written to.
//!
//! The host owns the actual renderers. A session only pushes values into
//! these sinks, and clears them when the measurement is cleared.

use crate::math::DVec3;

/// Renders connected line segments in world space.
pub trait PolylineSink {
    /// Replaces the rendered positions.
    fn set_positions(&mut self, positions: &[DVec3], width: f32);
    /// Renders nothing.
    fn clear_positions(&mut self);
}

/// Renders a procedural triangle mesh in world space.
pub trait MeshSink {
    /// Replaces the rendered mesh. Triangles are wound counter-clockwise.
    fn set_mesh(&mut self, vertices: &[DVec3], triangles: &[[u32; 3]]);
    /// Renders nothing.
    fn clear_mesh(&mut self);
}

/// Renders a text label facing the viewer.
pub trait LabelSink {
    /// Replaces the label text and its world space anchor.
    fn set_label(&mut self, text: &str, anchor: DVec3);
    /// Renders nothing.
    fn clear_label(&mut self);
}

/// All outputs of a measurement.
pub trait MeasureSinks: PolylineSink + MeshSink + LabelSink {}

impl<T: PolylineSink + MeshSink + LabelSink + ?Sized> MeasureSinks for T {}

impl<T: PolylineSink + ?Sized> PolylineSink for &mut T {
    fn set_positions(&mut self, positions: &[DVec3], width: f32) {
        (**self).set_positions(positions, width);
    }

    fn clear_positions(&mut self) {
        (**self).clear_positions();
    }
}

impl<T: MeshSink + ?Sized> MeshSink for &mut T {
    fn set_mesh(&mut self, vertices: &[DVec3], triangles: &[[u32; 3]]) {
        (**self).set_mesh(vertices, triangles);
    }

    fn clear_mesh(&mut self) {
        (**self).clear_mesh();
    }
}

impl<T: LabelSink + ?Sized> LabelSink for &mut T {
    fn set_label(&mut self, text: &str, anchor: DVec3) {
        (**self).set_label(text, anchor);
    }

    fn clear_label(&mut self) {
        (**self).clear_label();
    }
}

/// Three independent sinks used together.
#[derive(Debug, Default, Clone)]
pub struct SinkSet<P, M, L> {
    pub polyline: P,
    pub mesh: M,
    pub label: L,
}

impl<P, M, L> SinkSet<P, M, L> {
    pub fn new(polyline: P, mesh: M, label: L) -> Self {
        Self {
            polyline,
            mesh,
            label,
        }
    }
}

impl<P: PolylineSink, M, L> PolylineSink for SinkSet<P, M, L> {
    fn set_positions(&mut self, positions: &[DVec3], width: f32) {
        self.polyline.set_positions(positions, width);
    }

    fn clear_positions(&mut self) {
        self.polyline.clear_positions();
    }
}

impl<P, M: MeshSink, L> MeshSink for SinkSet<P, M, L> {
    fn set_mesh(&mut self, vertices: &[DVec3], triangles: &[[u32; 3]]) {
        self.mesh.set_mesh(vertices, triangles);
    }

    fn clear_mesh(&mut self) {
        self.mesh.clear_mesh();
    }
}

impl<P, M, L: LabelSink> LabelSink for SinkSet<P, M, L> {
    fn set_label(&mut self, text: &str, anchor: DVec3) {
        self.label.set_label(text, anchor);
    }

    fn clear_label(&mut self) {
        self.label.clear_label();
    }
}
