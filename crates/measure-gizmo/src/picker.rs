use enum_dispatch::enum_dispatch;

use crate::config::{MeasureConfig, PreparedMeasureConfig};
use crate::math::{intersect_plane, intersect_triangle, screen_to_world, DMat4, DVec3, Pos2, Rect};

/// A world space ray cast from the camera through a pointer position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    /// Pointer position the ray was cast through, in viewport coordinates
    pub screen_pos: Pos2,
    /// Origin of the ray in world space
    pub origin: DVec3,
    /// Unit direction of the ray in world space
    pub direction: DVec3,
}

impl Ray {
    /// Point at distance `t` along the ray
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Nearest intersection of a ray and a surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    /// Intersection point in world space
    pub point: DVec3,
    /// Distance from the ray origin to the intersection
    pub distance: f64,
}

/// A surface that points can be picked from.
#[enum_dispatch]
pub trait PickSurface {
    /// Returns the nearest intersection in front of the ray origin, if any.
    fn raycast(&self, ray: &Ray) -> Option<RayHit>;

    /// Transform from the surface's local space to world space.
    ///
    /// Picked points are stored in local space, so that a live tracked
    /// measurement follows the surface when it moves.
    fn local_to_world(&self) -> DMat4 {
        DMat4::IDENTITY
    }
}

/// Surfaces provided by this crate.
#[derive(Debug, Clone)]
#[enum_dispatch(PickSurface)]
pub enum Surface {
    Triangles(TriangleSurface),
    Plane(PlaneSurface),
}

/// An indexed triangle mesh placed in the world by a model matrix.
#[derive(Debug, Clone, Default)]
pub struct TriangleSurface {
    /// Vertices in local space
    pub vertices: Vec<DVec3>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
    /// Local to world transform
    pub transform: DMat4,
}

impl TriangleSurface {
    pub fn new(vertices: Vec<DVec3>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            transform: DMat4::IDENTITY,
        }
    }

    /// Axis aligned box centered at the local origin
    pub fn cuboid(half_extents: DVec3) -> Self {
        let corners = (0..8)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { -1.0 } else { 1.0 },
                    if i & 2 == 0 { -1.0 } else { 1.0 },
                    if i & 4 == 0 { -1.0 } else { 1.0 },
                ) * half_extents
            })
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 4, 6, 0, 6, 2, // -x
            1, 3, 7, 1, 7, 5, // +x
            0, 1, 5, 0, 5, 4, // -y
            2, 6, 7, 2, 7, 3, // +y
            0, 2, 3, 0, 3, 1, // -z
            4, 5, 7, 4, 7, 6, // +z
        ];

        Self::new(corners, indices)
    }

    pub fn with_transform(mut self, transform: impl Into<mint::RowMatrix4<f64>>) -> Self {
        self.transform = DMat4::from(transform.into());
        self
    }

    fn triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|triangle| {
            Some([
                *self.vertices.get(triangle[0] as usize)?,
                *self.vertices.get(triangle[1] as usize)?,
                *self.vertices.get(triangle[2] as usize)?,
            ])
        })
    }
}

impl PickSurface for TriangleSurface {
    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let world_to_local = self.transform.inverse();
        let origin = world_to_local.transform_point3(ray.origin);
        let direction = world_to_local.transform_vector3(ray.direction);

        // The ray parameter is preserved by affine transforms, so the nearest
        // local hit is also the nearest world hit.
        let t = self
            .triangles()
            .filter_map(|triangle| intersect_triangle(origin, direction, triangle))
            .min_by(f64::total_cmp)?;

        let point = ray.at(t);
        Some(RayHit {
            point,
            distance: point.distance(ray.origin),
        })
    }

    fn local_to_world(&self) -> DMat4 {
        self.transform
    }
}

/// An infinite plane placed in the world by a model matrix.
#[derive(Debug, Copy, Clone)]
pub struct PlaneSurface {
    /// A point on the plane, in local space
    pub origin: DVec3,
    /// Normal of the plane, in local space
    pub normal: DVec3,
    /// Local to world transform
    pub transform: DMat4,
}

impl Default for PlaneSurface {
    fn default() -> Self {
        Self::new(DVec3::ZERO, DVec3::Y)
    }
}

impl PlaneSurface {
    pub fn new(origin: DVec3, normal: DVec3) -> Self {
        Self {
            origin,
            normal: normal.normalize_or_zero(),
            transform: DMat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: impl Into<mint::RowMatrix4<f64>>) -> Self {
        self.transform = DMat4::from(transform.into());
        self
    }
}

impl PickSurface for PlaneSurface {
    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        if self.normal == DVec3::ZERO {
            return None;
        }

        let origin = self.transform.transform_point3(self.origin);
        let normal = self
            .transform
            .inverse()
            .transpose()
            .transform_vector3(self.normal)
            .normalize_or_zero();

        let t = intersect_plane(normal, origin, ray.origin, ray.direction)?;

        Some(RayHit {
            point: ray.at(t),
            distance: t,
        })
    }

    fn local_to_world(&self) -> DMat4 {
        self.transform
    }
}

/// A point picked from a surface.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PickedPoint {
    /// Position in the surface's local space
    pub local: DVec3,
    /// Position in world space at the time of picking
    pub world: DVec3,
}

impl PickedPoint {
    /// Point that is not attached to any surface
    pub fn from_world(world: impl Into<mint::Vector3<f64>>) -> Self {
        let world = DVec3::from(world.into());
        Self {
            local: world,
            world,
        }
    }

    /// World position after the surface it was picked from has moved
    pub(crate) fn tracked(&self, local_to_world: DMat4) -> DVec3 {
        local_to_world.transform_point3(self.local)
    }
}

/// Turns pointer positions into points on a surface.
#[derive(Debug, Copy, Clone)]
pub struct PointPicker {
    viewport: Rect,
    inverse_view_projection: DMat4,
}

impl PointPicker {
    pub fn new(config: &MeasureConfig) -> Self {
        Self::from_prepared(&PreparedMeasureConfig::from_config(*config))
    }

    pub(crate) fn from_prepared(config: &PreparedMeasureConfig) -> Self {
        Self {
            viewport: config.viewport,
            inverse_view_projection: config.inverse_view_projection,
        }
    }

    /// Calculate a world space ray from given screen space position
    pub fn pointer_ray(&self, screen_pos: Pos2) -> Ray {
        let origin = screen_to_world(self.viewport, self.inverse_view_projection, screen_pos, -1.0);
        let target = screen_to_world(self.viewport, self.inverse_view_projection, screen_pos, 1.0);

        Ray {
            screen_pos,
            origin,
            direction: (target - origin).normalize_or_zero(),
        }
    }

    /// Casts a ray through the pointer position against the surface.
    ///
    /// Returns [`None`] if nothing was hit.
    pub fn try_pick(&self, pointer_pos: Pos2, surface: &impl PickSurface) -> Option<PickedPoint> {
        if !self.viewport.is_finite() || !self.viewport.is_positive() {
            return None;
        }

        let ray = self.pointer_ray(pointer_pos);
        if ray.direction == DVec3::ZERO {
            return None;
        }

        let hit = surface.raycast(&ray)?;
        let world = hit.point;

        Some(PickedPoint {
            local: surface.local_to_world().inverse().transform_point3(world),
            world,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use approx::assert_relative_eq;

    fn camera_config() -> MeasureConfig {
        let viewport = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let view = DMat4::look_at_rh(DVec3::new(0.0, 0.0, 10.0), DVec3::ZERO, DVec3::Y);
        let projection =
            DMat4::perspective_rh(std::f64::consts::FRAC_PI_4, 800.0 / 600.0, 0.1, 100.0);

        MeasureConfig {
            view_matrix: view.into(),
            projection_matrix: projection.into(),
            viewport,
            ..Default::default()
        }
    }

    #[test]
    fn pointer_ray_through_center_looks_forward() {
        let picker = PointPicker::new(&camera_config());
        let ray = picker.pointer_ray(Pos2::new(400.0, 300.0));

        assert!(ray.direction.abs_diff_eq(-DVec3::Z, 1e-9));
        assert_relative_eq!(ray.origin.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ray.origin.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn picks_nearest_face_of_cuboid() {
        let picker = PointPicker::new(&camera_config());
        let surface = TriangleSurface::cuboid(DVec3::ONE);

        let picked = picker
            .try_pick(Pos2::new(400.0, 300.0), &surface)
            .expect("center of the screen hits the box");

        assert!(picked.world.abs_diff_eq(DVec3::new(0.0, 0.0, 1.0), 1e-9));
        assert_eq!(picked.local, picked.world);
    }

    #[test]
    fn misses_are_none() {
        let picker = PointPicker::new(&camera_config());
        let surface = TriangleSurface::cuboid(DVec3::splat(0.1));

        assert!(picker.try_pick(Pos2::new(10.0, 10.0), &surface).is_none());
        assert!(
            picker
                .try_pick(Pos2::new(400.0, 300.0), &TriangleSurface::default())
                .is_none()
        );
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let surface = TriangleSurface::new(vec![DVec3::ZERO, DVec3::X], vec![0, 1, 7]);
        let ray = Ray {
            screen_pos: Pos2::ZERO,
            origin: DVec3::new(0.1, 0.1, 1.0),
            direction: -DVec3::Z,
        };

        assert!(surface.raycast(&ray).is_none());
    }

    #[test]
    fn picked_points_are_stored_in_local_space() {
        let picker = PointPicker::new(&camera_config());
        let transform = DMat4::from_translation(DVec3::new(0.0, 0.0, -2.0));
        let surface = Surface::from(TriangleSurface::cuboid(DVec3::ONE).with_transform(transform));

        let picked = picker.try_pick(Pos2::new(400.0, 300.0), &surface).unwrap();

        assert!(picked.world.abs_diff_eq(DVec3::new(0.0, 0.0, -1.0), 1e-9));
        assert!(picked.local.abs_diff_eq(DVec3::new(0.0, 0.0, 1.0), 1e-9));

        let moved = DMat4::from_translation(DVec3::new(3.0, 0.0, 0.0));
        assert!(picked.tracked(moved).abs_diff_eq(DVec3::new(3.0, 0.0, 1.0), 1e-9));
    }

    #[test]
    fn plane_surface_is_hit_through_the_camera() {
        let picker = PointPicker::new(&camera_config());
        let surface = Surface::from(PlaneSurface::new(DVec3::ZERO, DVec3::Z));

        let picked = picker.try_pick(Pos2::new(400.0, 300.0), &surface).unwrap();
        assert!(picked.world.abs_diff_eq(DVec3::ZERO, 1e-9));

        // Plane facing sideways is never hit by a forward ray
        let sideways = PlaneSurface::new(DVec3::ZERO, DVec3::X);
        assert!(picker.try_pick(Pos2::new(400.0, 300.0), &sideways).is_none());
    }

    #[test]
    fn no_pick_without_viewport() {
        let picker = PointPicker::new(&MeasureConfig::default());
        let surface = PlaneSurface::new(DVec3::ZERO, DVec3::Z);

        assert!(picker.try_pick(Pos2::new(0.0, 0.0), &surface).is_none());
    }
}
