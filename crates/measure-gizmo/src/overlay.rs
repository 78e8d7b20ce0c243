use std::ops::{Add, AddAssign};

use ecolor::Rgba;
use epaint::Mesh;

use crate::config::{MeasureConfig, PreparedMeasureConfig};
use crate::math::DVec3;
use crate::shape::ShapeBuilder;
use crate::sinks::{LabelSink, MeshSink, PolylineSink};

/// Sink that keeps the latest outputs of a measurement, ready to be drawn
/// on top of a viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureOverlay {
    /// Line positions in world space
    pub line_positions: Vec<DVec3>,
    /// Line width in points
    pub line_width: f32,
    /// Arc vertices in world space
    pub mesh_vertices: Vec<DVec3>,
    /// Arc triangles indexing into `mesh_vertices`
    pub mesh_triangles: Vec<[u32; 3]>,
    /// Label text. Empty when there is no label.
    pub label_text: String,
    /// Label anchor in world space
    pub label_anchor: DVec3,
}

impl MeasureOverlay {
    /// Whether nothing would be drawn
    pub fn is_empty(&self) -> bool {
        self.line_positions.is_empty() && self.mesh_vertices.is_empty() && self.label_text.is_empty()
    }

    /// Return all the necessary data to draw the overlay.
    ///
    /// The draw data consists of vertices in viewport coordinates.
    pub fn draw(&self, config: &MeasureConfig) -> MeasureDrawData {
        if !config.viewport.is_finite() || self.is_empty() {
            return MeasureDrawData::default();
        }

        let config = PreparedMeasureConfig::from_config(*config);
        let visuals = config.visuals;
        let shape_builder = ShapeBuilder::new(
            config.view_projection,
            config.viewport,
            config.pixels_per_point,
        );

        let mut draw_data = MeasureDrawData::default();

        draw_data += shape_builder
            .triangles(&self.mesh_vertices, &self.mesh_triangles, visuals.arc_color)
            .into();

        draw_data += shape_builder
            .segments(&self.line_positions, (self.line_width, visuals.line_color))
            .into();

        if !self.label_text.is_empty() {
            draw_data.label = shape_builder
                .project(self.label_anchor)
                .map(|pos| LabelDrawData {
                    text: self.label_text.clone(),
                    pos: [pos.x, pos.y],
                    color: Rgba::from(visuals.label_color).to_array(),
                    size: visuals.label_size,
                });
        }

        draw_data
    }
}

impl PolylineSink for MeasureOverlay {
    fn set_positions(&mut self, positions: &[DVec3], width: f32) {
        self.line_positions.clear();
        self.line_positions.extend_from_slice(positions);
        self.line_width = width;
    }

    fn clear_positions(&mut self) {
        self.line_positions.clear();
    }
}

impl MeshSink for MeasureOverlay {
    fn set_mesh(&mut self, vertices: &[DVec3], triangles: &[[u32; 3]]) {
        self.mesh_vertices.clear();
        self.mesh_vertices.extend_from_slice(vertices);
        self.mesh_triangles.clear();
        self.mesh_triangles.extend_from_slice(triangles);
    }

    fn clear_mesh(&mut self) {
        self.mesh_vertices.clear();
        self.mesh_triangles.clear();
    }
}

impl LabelSink for MeasureOverlay {
    fn set_label(&mut self, text: &str, anchor: DVec3) {
        text.clone_into(&mut self.label_text);
        self.label_anchor = anchor;
    }

    fn clear_label(&mut self) {
        self.label_text.clear();
        self.label_anchor = DVec3::ZERO;
    }
}

/// Data used to draw [`MeasureOverlay`].
#[derive(Default, Clone, Debug)]
pub struct MeasureDrawData {
    /// Vertices in viewport space.
    pub vertices: Vec<[f32; 2]>,
    /// RGBA colors.
    pub colors: Vec<[f32; 4]>,
    /// Indices to the vertex data.
    pub indices: Vec<u32>,
    /// Label to draw on top of the mesh.
    pub label: Option<LabelDrawData>,
}

/// Text label positioned in viewport space.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelDrawData {
    /// Text to draw
    pub text: String,
    /// Anchor in viewport space. The text is centered on it.
    pub pos: [f32; 2],
    /// RGBA color.
    pub color: [f32; 4],
    /// Font size in points
    pub size: f32,
}

impl From<Mesh> for MeasureDrawData {
    fn from(mesh: Mesh) -> Self {
        let (vertices, colors): (Vec<_>, Vec<_>) = mesh
            .vertices
            .iter()
            .map(|vertex| {
                (
                    [vertex.pos.x, vertex.pos.y],
                    Rgba::from(vertex.color).to_array(),
                )
            })
            .unzip();

        Self {
            vertices,
            colors,
            indices: mesh.indices,
            label: None,
        }
    }
}

impl AddAssign for MeasureDrawData {
    fn add_assign(&mut self, rhs: Self) {
        let index_offset = self.vertices.len() as u32;
        self.vertices.extend(rhs.vertices);
        self.colors.extend(rhs.colors);
        self.indices
            .extend(rhs.indices.into_iter().map(|idx| index_offset + idx));
        if rhs.label.is_some() {
            self.label = rhs.label;
        }
    }
}

impl Add for MeasureDrawData {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}
