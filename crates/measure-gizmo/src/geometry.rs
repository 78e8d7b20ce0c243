//! Angle computation and arc tessellation.
//!
//! The arc sweeps from the first selected ray toward the second, the short way,
//! in the plane defined by the two rays. The plane normal is `dir1 × dir2`
//! (right-handed), so rotating `dir1` about the normal by the measured angle
//! lands on `dir2`, and the fan triangles wind counter-clockwise around it.

use thiserror::Error;

use crate::config::{MAX_ARC_SEGMENTS, MIN_ARC_SEGMENTS};
use crate::math::{reject_from, rotate_about_axis, DVec3};

/// Edges shorter than this cannot be normalized
pub const EDGE_EPSILON: f64 = 1e-9;
/// Cross products and bisectors shorter than this are treated as degenerate
pub const NORMAL_EPSILON: f64 = 1e-9;

/// Errors from computing an angle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AngleError {
    /// One of the two edges from the apex has zero length
    #[error("Degenerate edge: point {index} coincides with the apex")]
    DegenerateEdge {
        /// Index of the point (1 or 2) that coincides with the apex
        index: usize,
    },
}

/// Shape of the tessellated arc.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcParams {
    /// Number of triangles in the fan.
    /// Clamped to [`MIN_ARC_SEGMENTS`]..=[`MAX_ARC_SEGMENTS`].
    pub segments: u32,
    /// Distance of the rim from the apex
    pub radius: f64,
    /// Distance of the label from the rim along the bisector
    pub label_offset: f64,
}

/// Angle at an apex, with the geometry needed to visualize it.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleResult {
    /// The point the angle is measured at
    pub apex: DVec3,
    /// The angle in degrees, in `[0, 180]`
    pub angle_degrees: f64,
    /// Unit normal of the plane containing both rays
    pub plane_normal: DVec3,
    /// Whether the rays were (anti-)parallel and the normal came from the fallback
    pub normal_fallback: bool,
    /// Unit vector halfway between the two rays
    pub bisector: DVec3,
    /// Apex followed by the rim points of the arc
    pub arc_vertices: Vec<DVec3>,
    /// Fan triangles indexing into `arc_vertices`
    pub arc_triangles: Vec<[u32; 3]>,
    /// World position of the label
    pub label_anchor: DVec3,
}

/// Computes the angle at apex `a` between the rays toward `b` and `c`.
///
/// `fallback_normal` is used when the rays are parallel or anti-parallel and
/// the plane they span is undefined. It does not need to be perpendicular to
/// the rays. If it is missing or parallel to the rays, any vector perpendicular
/// to the first ray is used instead.
pub fn compute_angle(
    a: DVec3,
    b: DVec3,
    c: DVec3,
    params: &ArcParams,
    fallback_normal: Option<DVec3>,
) -> Result<AngleResult, AngleError> {
    let dir1 = edge_direction(a, b).ok_or(AngleError::DegenerateEdge { index: 1 })?;
    let dir2 = edge_direction(a, c).ok_or(AngleError::DegenerateEdge { index: 2 })?;

    let angle = dir1.dot(dir2).clamp(-1.0, 1.0).acos();

    let cross = dir1.cross(dir2);
    let (plane_normal, normal_fallback) = if cross.length() < NORMAL_EPSILON {
        (perpendicular_normal(dir1, fallback_normal), true)
    } else {
        (cross.normalize(), false)
    };

    // The angle is near 180° when the sum vanishes. The rim midpoint is
    // where the semicircle actually bulges.
    let sum = dir1 + dir2;
    let bisector = if sum.length() < NORMAL_EPSILON {
        plane_normal.cross(dir1).normalize()
    } else {
        sum.normalize()
    };

    let segments = params.segments.clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS);
    let (arc_vertices, arc_triangles) =
        tessellate_arc(a, dir1, plane_normal, angle, params.radius, segments);

    Ok(AngleResult {
        apex: a,
        angle_degrees: angle.to_degrees(),
        plane_normal,
        normal_fallback,
        bisector,
        arc_vertices,
        arc_triangles,
        label_anchor: a + bisector * (params.radius + params.label_offset),
    })
}

/// Builds a triangle fan approximating the arc swept by rotating `start_dir`
/// about `normal` by `angle` radians.
///
/// Produces `segments + 2` vertices, the apex first, and `segments` triangles.
pub fn tessellate_arc(
    apex: DVec3,
    start_dir: DVec3,
    normal: DVec3,
    angle: f64,
    radius: f64,
    segments: u32,
) -> (Vec<DVec3>, Vec<[u32; 3]>) {
    let segments = segments.max(1);

    let mut vertices = Vec::with_capacity(segments as usize + 2);
    vertices.push(apex);
    vertices.extend((0..=segments).map(|i| {
        let step = angle * f64::from(i) / f64::from(segments);
        apex + rotate_about_axis(start_dir, normal, step) * radius
    }));

    let triangles = (1..=segments).map(|i| [0, i, i + 1]).collect();

    (vertices, triangles)
}

/// Formats an angle for display, e.g. `90.0°`
pub fn format_angle(angle_degrees: f64, decimals: usize) -> String {
    format!("{angle_degrees:.decimals$}°")
}

fn edge_direction(from: DVec3, to: DVec3) -> Option<DVec3> {
    let edge = to - from;
    (edge.length() >= EDGE_EPSILON).then(|| edge.normalize())
}

fn perpendicular_normal(dir: DVec3, preferred: Option<DVec3>) -> DVec3 {
    preferred
        .map(|preferred| reject_from(preferred, dir))
        .filter(|normal| normal.length() >= NORMAL_EPSILON)
        .map_or_else(|| dir.any_orthonormal_vector(), DVec3::normalize)
}
