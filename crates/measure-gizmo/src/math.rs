pub use emath::{Pos2, Rect, Vec2};
pub use glam::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4, Vec4Swizzles};

/// Finds the distance along a ray to its intersection with a plane.
///
/// Returns [`None`] when the ray is parallel to the plane or the plane
/// lies behind the ray origin.
pub(crate) fn intersect_plane(
    plane_normal: DVec3,
    plane_origin: DVec3,
    ray_origin: DVec3,
    ray_dir: DVec3,
) -> Option<f64> {
    let denom = plane_normal.dot(ray_dir);

    if denom.abs() < 10e-8 {
        return None;
    }

    let t = (plane_origin - ray_origin).dot(plane_normal) / denom;
    (t >= 0.0).then_some(t)
}

/// Finds the distance along a ray to its intersection with a triangle.
///
/// Both faces of the triangle are hit.
///
/// Credit: Fast, Minimum Storage Ray/Triangle Intersection by Möller and Trumbore
pub(crate) fn intersect_triangle(
    ray_origin: DVec3,
    ray_dir: DVec3,
    triangle: [DVec3; 3],
) -> Option<f64> {
    let [v0, v1, v2] = triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let p = ray_dir.cross(edge2);
    let det = edge1.dot(p);

    if det.abs() < 1e-12 {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray_origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray_dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Rotates a vector about a unit axis by the given angle in radians
pub(crate) fn rotate_about_axis(vec: DVec3, axis: DVec3, angle: f64) -> DVec3 {
    DQuat::from_axis_angle(axis, angle) * vec
}

/// Removes the component of `vec` along the unit vector `along`
pub(crate) fn reject_from(vec: DVec3, along: DVec3) -> DVec3 {
    vec - along * vec.dot(along)
}

/// Calculates 2d screen coordinates from 3d world coordinates
pub(crate) fn world_to_screen(viewport: Rect, mvp: DMat4, pos: DVec3) -> Option<Pos2> {
    let mut pos = mvp * DVec4::from((pos, 1.0));

    if pos.w < 1e-10 {
        return None;
    }

    pos /= pos.w;
    pos.y *= -1.0;

    let center = viewport.center();

    Some(Pos2::new(
        (f64::from(center.x) + pos.x * f64::from(viewport.width()) / 2.0) as f32,
        (f64::from(center.y) + pos.y * f64::from(viewport.height()) / 2.0) as f32,
    ))
}

/// Calculates 3d world coordinates from 2d screen coordinates
pub(crate) fn screen_to_world(viewport: Rect, mat: DMat4, pos: Pos2, z: f64) -> DVec3 {
    let x = f64::from(((pos.x - viewport.min.x) / viewport.width()) * 2.0 - 1.0);
    let y = f64::from(((pos.y - viewport.min.y) / viewport.height()) * 2.0 - 1.0);

    let mut world_pos = mat * DVec4::new(x, -y, z, 1.0);

    // w is zero when far plane is set to infinity
    if world_pos.w.abs() < 1e-7 {
        world_pos.w = 1e-7;
    }

    world_pos /= world_pos.w;

    world_pos.xyz()
}
