use ecolor::Color32;
use epaint::{Mesh, Shape, Stroke, TessellationOptions, Tessellator, TextureId};
use glam::{DMat4, DVec3};

use crate::math::{world_to_screen, Pos2, Rect};

/// Projects world space geometry to the viewport and tessellates it.
pub(crate) struct ShapeBuilder {
    view_projection: DMat4,
    viewport: Rect,
    pixels_per_point: f32,
}

impl ShapeBuilder {
    pub(crate) fn new(view_projection: DMat4, viewport: Rect, pixels_per_point: f32) -> Self {
        Self {
            view_projection,
            viewport,
            pixels_per_point,
        }
    }

    fn tessellate_shape(&self, shape: Shape) -> Mesh {
        let mut tessellator = Tessellator::new(
            self.pixels_per_point,
            TessellationOptions {
                feathering: true,
                ..Default::default()
            },
            Default::default(),
            Default::default(),
        );

        let mut mesh = Mesh::default();
        tessellator.tessellate_shape(shape, &mut mesh);

        mesh.texture_id = TextureId::default();
        mesh
    }

    pub(crate) fn line_segment(&self, from: DVec3, to: DVec3, stroke: impl Into<Stroke>) -> Mesh {
        let Some((from, to)) = self.project(from).zip(self.project(to)) else {
            return Mesh::default();
        };

        self.tessellate_shape(Shape::line_segment([from, to], stroke))
    }

    /// Draws every consecutive pair of positions as its own segment.
    ///
    /// Segments that double back, like `[A, B, A, C]`, would otherwise
    /// get spiky joins.
    pub(crate) fn segments(&self, positions: &[DVec3], stroke: impl Into<Stroke>) -> Mesh {
        let stroke = stroke.into();

        let mut mesh = Mesh::default();
        for pair in positions.windows(2) {
            mesh.append(self.line_segment(pair[0], pair[1], stroke));
        }
        mesh
    }

    /// Builds a flat colored mesh from world space triangles.
    ///
    /// Nothing is drawn if any vertex cannot be projected.
    pub(crate) fn triangles(
        &self,
        vertices: &[DVec3],
        triangles: &[[u32; 3]],
        fill: Color32,
    ) -> Mesh {
        let Some(points) = vertices
            .iter()
            .map(|vertex| self.project(*vertex))
            .collect::<Option<Vec<_>>>()
        else {
            return Mesh::default();
        };

        let mut mesh = Mesh::default();
        for point in points {
            mesh.colored_vertex(point, fill);
        }
        for &[a, b, c] in triangles {
            if [a, b, c].iter().all(|&index| (index as usize) < vertices.len()) {
                mesh.add_triangle(a, b, c);
            }
        }
        mesh
    }

    pub(crate) fn project(&self, pos: DVec3) -> Option<Pos2> {
        world_to_screen(self.viewport, self.view_projection, pos)
    }
}
