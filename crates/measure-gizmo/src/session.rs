use tracing::{debug, trace, warn};

use crate::config::{MeasureConfig, MeasureOutput, PreparedMeasureConfig};
use crate::geometry::{compute_angle, format_angle, AngleError, AngleResult, ArcParams, EDGE_EPSILON};
use crate::math::{DMat4, DVec3, Pos2};
use crate::picker::{PickSurface, PickedPoint, PointPicker};
use crate::sinks::MeasureSinks;

/// Number of points in a measurement: the apex and one point on each ray.
pub const MAX_POINTS: usize = 3;

/// Progress of a measurement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeasureState {
    /// No points picked
    Empty,
    /// One or two points picked
    Collecting,
    /// All points picked and the angle is shown
    Resolved,
}

/// Points picked so far, apex first. Never holds more than [`MAX_POINTS`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PickSequence {
    points: [PickedPoint; MAX_POINTS],
    len: usize,
}

impl PickSequence {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == MAX_POINTS
    }

    /// Appends a point, or gives it back if the sequence is already full.
    pub fn push(&mut self, point: PickedPoint) -> Result<(), PickedPoint> {
        let Some(slot) = self.points.get_mut(self.len) else {
            return Err(point);
        };
        *slot = point;
        self.len += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points = Default::default();
        self.len = 0;
    }

    pub fn as_slice(&self) -> &[PickedPoint] {
        &self.points[..self.len]
    }

    pub fn first(&self) -> Option<&PickedPoint> {
        self.as_slice().first()
    }

    /// Moves the world positions along with the surface the points were picked from
    pub(crate) fn retrack(&mut self, local_to_world: DMat4) {
        let len = self.len;
        for point in &mut self.points[..len] {
            point.world = point.tracked(local_to_world);
        }
    }
}

/// What happened to a pick attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The point was added. Contains the new state.
    Added(MeasureState),
    /// The pointer ray did not hit the surface
    Missed,
    /// The point would make the angle undefined and was dropped
    Rejected(AngleError),
    /// The measurement is already resolved. Clear it to start over.
    Full,
}

/// Information needed for interacting with a measurement.
#[derive(Default, Clone, Copy, Debug)]
pub struct MeasureInteraction {
    /// Current cursor position in window coordinates.
    pub cursor_pos: (f32, f32),
    /// Whether the pick button was pressed this frame.
    /// Only the press edge picks, holding the button does nothing.
    pub pressed: bool,
    /// Whether the measurement should be cleared this frame.
    pub clear: bool,
}

/// An interactive three-point angle measurement.
///
/// Picks the apex and two more points, then writes a polyline, an arc mesh
/// and a label into its sinks. The sinks may be owned or borrowed (`&mut S`).
#[derive(Debug, Clone)]
pub struct AngleSession<S> {
    config: PreparedMeasureConfig,
    points: PickSequence,
    /// World positions the latest result was computed from
    resolved_points: [DVec3; MAX_POINTS],
    result: Option<AngleResult>,
    sinks: S,
}

impl<S: MeasureSinks + Default> Default for AngleSession<S> {
    fn default() -> Self {
        Self::new(MeasureConfig::default(), S::default())
    }
}

impl<S: MeasureSinks> AngleSession<S> {
    /// Creates a new measurement writing into the given sinks
    pub fn new(config: MeasureConfig, sinks: S) -> Self {
        Self {
            config: PreparedMeasureConfig::from_config(config),
            points: PickSequence::default(),
            resolved_points: [DVec3::ZERO; MAX_POINTS],
            result: None,
            sinks,
        }
    }

    /// Current configuration used by the measurement.
    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    /// Updates the configuration used by the measurement.
    ///
    /// A resolved measurement is redrawn with the new settings.
    pub fn update_config(&mut self, config: MeasureConfig) {
        let redraw = config.presentation_changed(&self.config);
        self.config.update_for_config(config);

        if redraw && self.result.is_some() {
            let [a, b, c] = self.resolved_points;
            self.clear_sinks();
            if let Err(err) = self.resolve(a, b, c) {
                debug!("{err}, measurement not redrawn");
            }
        }
    }

    pub fn state(&self) -> MeasureState {
        match self.points.len() {
            0 => MeasureState::Empty,
            MAX_POINTS => MeasureState::Resolved,
            _ => MeasureState::Collecting,
        }
    }

    pub fn points(&self) -> &PickSequence {
        &self.points
    }

    /// The latest angle, if resolved.
    pub fn result(&self) -> Option<&AngleResult> {
        self.result.as_ref()
    }

    pub fn sinks(&self) -> &S {
        &self.sinks
    }

    pub fn sinks_mut(&mut self) -> &mut S {
        &mut self.sinks
    }

    pub fn into_sinks(self) -> S {
        self.sinks
    }

    /// Updates the measurement based on given interaction information.
    ///
    /// Clears first if requested, then picks on a press and finally follows
    /// the surface if live tracking is enabled.
    ///
    /// Returns the latest angle if the measurement is resolved.
    pub fn update(
        &mut self,
        interaction: MeasureInteraction,
        surface: &impl PickSurface,
    ) -> Option<&AngleResult> {
        if interaction.clear {
            self.clear();
        }

        if interaction.pressed {
            self.pick(Pos2::from(interaction.cursor_pos), surface);
        }

        self.tick(surface);

        self.result.as_ref()
    }

    /// Picks a point from the surface under the pointer.
    ///
    /// With live tracking, the points picked so far first follow the surface.
    pub fn pick(&mut self, pointer_pos: Pos2, surface: &impl PickSurface) -> PickOutcome {
        if self.points.is_full() {
            trace!("Measurement is resolved, ignoring pick");
            return PickOutcome::Full;
        }

        // Earlier points must be compared in the surface's current pose
        if self.config.live_tracking {
            self.points.retrack(surface.local_to_world());
        }

        let picker = PointPicker::from_prepared(&self.config);
        match picker.try_pick(pointer_pos, surface) {
            Some(picked) => self.add_point(picked),
            None => {
                debug!(x = pointer_pos.x, y = pointer_pos.y, "Pick missed the surface");
                PickOutcome::Missed
            }
        }
    }

    /// Adds an already picked point.
    ///
    /// The third point resolves the measurement and writes all outputs at once.
    pub fn add_point(&mut self, picked: PickedPoint) -> PickOutcome {
        if self.points.is_full() {
            trace!("Measurement is resolved, ignoring point");
            return PickOutcome::Full;
        }

        if self
            .points
            .first()
            .is_some_and(|apex| apex.world.distance(picked.world) < EDGE_EPSILON)
        {
            let err = AngleError::DegenerateEdge {
                index: self.points.len(),
            };
            warn!("{err}, dropping the point");
            return PickOutcome::Rejected(err);
        }

        if self.points.len() == MAX_POINTS - 1 {
            let [a, b] = [self.points.as_slice()[0].world, self.points.as_slice()[1].world];
            if let Err(err) = self.resolve(a, b, picked.world) {
                warn!("{err}, dropping the point");
                return PickOutcome::Rejected(err);
            }
        }

        if self.points.push(picked).is_err() {
            return PickOutcome::Full;
        }

        let state = self.state();
        debug!(count = self.points.len(), ?state, "Picked point {:?}", picked.world);
        PickOutcome::Added(state)
    }

    /// Recomputes a resolved measurement from the surface's current transform.
    ///
    /// Does nothing unless live tracking is enabled. If the points have become
    /// degenerate, the previous outputs are kept.
    pub fn tick(&mut self, surface: &impl PickSurface) {
        if !self.config.live_tracking || self.result.is_none() {
            return;
        }

        let local_to_world = surface.local_to_world();
        let mut points = self.points.as_slice().iter().map(|point| point.tracked(local_to_world));
        let (Some(a), Some(b), Some(c)) = (points.next(), points.next(), points.next()) else {
            return;
        };

        if let Err(err) = self.resolve(a, b, c) {
            debug!("{err}, keeping the previous measurement");
        }
    }

    /// Clears the measurement and all of its outputs.
    pub fn clear(&mut self) {
        if !self.points.is_empty() {
            debug!("Clearing measurement");
        }

        self.points.clear();
        self.result = None;
        self.resolved_points = [DVec3::ZERO; MAX_POINTS];
        self.clear_sinks();
    }

    /// Computes the angle and writes the outputs. Nothing is written on error.
    fn resolve(&mut self, a: DVec3, b: DVec3, c: DVec3) -> Result<(), AngleError> {
        let params = ArcParams {
            segments: self.config.clamped_arc_segments(),
            radius: self.config.arc_radius,
            label_offset: self.config.label_offset,
        };

        // Keep the arc on the same side while the rays pass through parallel
        let fallback_normal = self
            .result
            .as_ref()
            .map_or_else(|| self.config.view_back(), |result| result.plane_normal);

        let result = compute_angle(a, b, c, &params, Some(fallback_normal))?;

        let outputs = self.config.outputs;
        let visuals = self.config.visuals;

        if outputs.contains(MeasureOutput::Polyline) {
            self.sinks.set_positions(&[a, b, a, c], visuals.line_width);
        }
        if outputs.contains(MeasureOutput::ArcMesh) {
            self.sinks
                .set_mesh(&result.arc_vertices, &result.arc_triangles);
        }
        if outputs.contains(MeasureOutput::Label) {
            let text = format_angle(result.angle_degrees, visuals.label_decimals);
            self.sinks.set_label(&text, result.label_anchor);
        }

        self.resolved_points = [a, b, c];
        self.result = Some(result);
        Ok(())
    }

    fn clear_sinks(&mut self) {
        self.sinks.clear_positions();
        self.sinks.clear_mesh();
        self.sinks.clear_label();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::MeasureOverlay;
    use crate::picker::PlaneSurface;
    use approx::assert_relative_eq;
    use enumset::enum_set;

    fn point(x: f64, y: f64, z: f64) -> PickedPoint {
        PickedPoint::from_world(DVec3::new(x, y, z))
    }

    fn resolved_session() -> AngleSession<MeasureOverlay> {
        let mut session = AngleSession::<MeasureOverlay>::default();
        session.add_point(point(0.0, 0.0, 0.0));
        session.add_point(point(1.0, 0.0, 0.0));
        session.add_point(point(0.0, 1.0, 0.0));
        session
    }

    #[test]
    fn pick_sequence_never_exceeds_capacity() {
        let mut sequence = PickSequence::default();
        for i in 0..MAX_POINTS {
            assert!(sequence.push(point(i as f64, 0.0, 0.0)).is_ok());
        }

        let extra = point(9.0, 9.0, 9.0);
        assert_eq!(sequence.push(extra), Err(extra));
        assert_eq!(sequence.len(), MAX_POINTS);
        assert!(sequence.is_full());
    }

    #[test]
    fn third_point_resolves_and_writes_all_outputs() {
        let mut session = AngleSession::<MeasureOverlay>::default();

        assert_eq!(
            session.add_point(point(0.0, 0.0, 0.0)),
            PickOutcome::Added(MeasureState::Collecting)
        );
        assert!(session.sinks().is_empty());

        assert_eq!(
            session.add_point(point(1.0, 0.0, 0.0)),
            PickOutcome::Added(MeasureState::Collecting)
        );
        assert!(session.sinks().is_empty());

        assert_eq!(
            session.add_point(point(0.0, 1.0, 0.0)),
            PickOutcome::Added(MeasureState::Resolved)
        );

        let overlay = session.sinks();
        assert_eq!(overlay.line_positions, vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::ZERO,
            DVec3::Y
        ]);
        assert_eq!(
            overlay.mesh_vertices.len(),
            session.config().clamped_arc_segments() as usize + 2
        );
        assert_eq!(overlay.label_text, "90.0°");
        assert_relative_eq!(session.result().unwrap().angle_degrees, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn resolved_session_ignores_more_points() {
        let mut session = resolved_session();
        let before = session.sinks().clone();

        assert_eq!(session.add_point(point(5.0, 5.0, 5.0)), PickOutcome::Full);
        assert_eq!(session.points().len(), MAX_POINTS);
        assert_eq!(session.sinks(), &before);
    }

    #[test]
    fn point_on_apex_is_rejected() {
        let mut session = AngleSession::<MeasureOverlay>::default();
        session.add_point(point(1.0, 1.0, 1.0));

        assert_eq!(
            session.add_point(point(1.0, 1.0, 1.0)),
            PickOutcome::Rejected(AngleError::DegenerateEdge { index: 1 })
        );
        assert_eq!(session.points().len(), 1);

        session.add_point(point(2.0, 1.0, 1.0));
        assert_eq!(
            session.add_point(point(1.0, 1.0, 1.0)),
            PickOutcome::Rejected(AngleError::DegenerateEdge { index: 2 })
        );
        assert_eq!(session.state(), MeasureState::Collecting);
        assert!(session.sinks().is_empty());
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = resolved_session();
        session.clear();

        assert_eq!(session.state(), MeasureState::Empty);
        assert!(session.points().is_empty());
        assert!(session.result().is_none());
        assert!(session.sinks().line_positions.is_empty());
        assert!(session.sinks().mesh_vertices.is_empty());
        assert!(session.sinks().label_text.is_empty());

        // Clearing twice is harmless
        session.clear();
        assert_eq!(session.state(), MeasureState::Empty);
    }

    #[test]
    fn disabled_outputs_are_not_written() {
        let mut session = AngleSession::new(
            MeasureConfig {
                outputs: enum_set!(MeasureOutput::Label),
                ..Default::default()
            },
            MeasureOverlay::default(),
        );
        session.add_point(point(0.0, 0.0, 0.0));
        session.add_point(point(1.0, 0.0, 0.0));
        session.add_point(point(1.0, 1.0, 0.0));

        assert!(session.sinks().line_positions.is_empty());
        assert!(session.sinks().mesh_vertices.is_empty());
        assert_eq!(session.sinks().label_text, "45.0°");
    }

    #[test]
    fn reconfiguring_redraws_resolved_measurement() {
        let mut session = resolved_session();
        session.update_config(MeasureConfig {
            arc_segments: 8,
            outputs: enum_set!(MeasureOutput::ArcMesh),
            ..*session.config()
        });

        assert_eq!(session.sinks().mesh_vertices.len(), 10);
        assert!(session.sinks().line_positions.is_empty());
        assert!(session.sinks().label_text.is_empty());
    }

    #[test]
    fn live_tracking_follows_the_surface() {
        let config = MeasureConfig {
            live_tracking: true,
            ..Default::default()
        };
        let mut session = AngleSession::new(config, MeasureOverlay::default());
        session.add_point(point(0.0, 0.0, 0.0));
        session.add_point(point(1.0, 0.0, 0.0));
        session.add_point(point(0.0, 1.0, 0.0));

        let moved = PlaneSurface::new(DVec3::ZERO, DVec3::Z)
            .with_transform(crate::math::DMat4::from_translation(DVec3::new(0.0, 0.0, 2.0)));
        session.tick(&moved);

        let result = session.result().unwrap();
        assert!(result.apex.abs_diff_eq(DVec3::new(0.0, 0.0, 2.0), 1e-12));
        assert_eq!(session.sinks().line_positions[1], DVec3::new(1.0, 0.0, 2.0));
        assert_relative_eq!(result.angle_degrees, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn frozen_points_ignore_surface_motion() {
        let mut session = resolved_session();
        let moved = PlaneSurface::new(DVec3::ZERO, DVec3::Z)
            .with_transform(crate::math::DMat4::from_translation(DVec3::ONE));
        session.tick(&moved);

        assert_eq!(session.result().unwrap().apex, DVec3::ZERO);
    }

    #[test]
    fn collapsed_tracking_keeps_previous_outputs() {
        let config = MeasureConfig {
            live_tracking: true,
            ..Default::default()
        };
        let mut session = AngleSession::new(config, MeasureOverlay::default());
        session.add_point(point(0.0, 0.0, 0.0));
        session.add_point(point(1.0, 0.0, 0.0));
        session.add_point(point(0.0, 1.0, 0.0));
        let before = session.sinks().clone();

        // Scaling to zero collapses every point onto the apex
        let collapsed = PlaneSurface::new(DVec3::ZERO, DVec3::Z)
            .with_transform(crate::math::DMat4::from_scale(DVec3::ZERO));
        session.tick(&collapsed);

        assert_eq!(session.sinks(), &before);
        assert_eq!(session.state(), MeasureState::Resolved);
    }

    #[test]
    fn straight_angle_is_stable_under_tracking() {
        let config = MeasureConfig {
            live_tracking: true,
            ..Default::default()
        };
        let mut session = AngleSession::new(config, MeasureOverlay::default());
        session.add_point(point(0.0, 0.0, 0.0));
        session.add_point(point(1.0, 0.0, 0.0));
        session.add_point(point(-1.0, 0.0, 0.0));

        let surface = PlaneSurface::default();
        let first = session.result().unwrap().clone();
        for _ in 0..3 {
            session.tick(&surface);
        }
        let last = session.result().unwrap();

        assert!(last.normal_fallback);
        assert!(last.plane_normal.abs_diff_eq(first.plane_normal, 1e-12));
        assert!(last.arc_vertices.iter().all(|vertex| vertex.is_finite()));
        assert_relative_eq!(last.angle_degrees, 180.0, epsilon = 1e-9);
    }

    /// Surface that every ray hits at the same world point
    struct FixedHit {
        point: DVec3,
        transform: DMat4,
    }

    impl PickSurface for FixedHit {
        fn raycast(&self, ray: &crate::picker::Ray) -> Option<crate::picker::RayHit> {
            Some(crate::picker::RayHit {
                point: self.point,
                distance: self.point.distance(ray.origin),
            })
        }

        fn local_to_world(&self) -> DMat4 {
            self.transform
        }
    }

    #[test]
    fn tracked_apex_is_rejected_after_surface_moves() {
        let config = MeasureConfig {
            viewport: crate::math::Rect::from_min_size(
                Pos2::ZERO,
                crate::math::Vec2::new(800.0, 600.0),
            ),
            live_tracking: true,
            ..Default::default()
        };
        let mut session = AngleSession::new(config, MeasureOverlay::default());
        let pointer = Pos2::new(400.0, 300.0);

        let at = |point: DVec3, transform: DMat4| FixedHit { point, transform };
        session.pick(pointer, &at(DVec3::ZERO, DMat4::IDENTITY));
        session.pick(pointer, &at(DVec3::X, DMat4::IDENTITY));

        // The apex now sits at (0, 2, 0) and that is where the third pick lands
        let moved = DMat4::from_translation(DVec3::new(0.0, 2.0, 0.0));
        assert_eq!(
            session.pick(pointer, &at(DVec3::new(0.0, 2.0, 0.0), moved)),
            PickOutcome::Rejected(AngleError::DegenerateEdge { index: 2 })
        );
        assert_eq!(session.state(), MeasureState::Collecting);
        assert!(session.result().is_none());
        assert!(session.sinks().is_empty());

        assert_eq!(
            session.pick(pointer, &at(DVec3::new(0.0, 3.0, 0.0), moved)),
            PickOutcome::Added(MeasureState::Resolved)
        );
        let result = session.result().unwrap();
        assert!(result.apex.abs_diff_eq(DVec3::new(0.0, 2.0, 0.0), 1e-12));
        assert_relative_eq!(result.angle_degrees, 90.0, epsilon = 1e-9);
        assert_eq!(session.sinks().line_positions[1], DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(session.sinks().label_text, "90.0°");
    }

    #[test]
    fn borrowed_sinks_are_written() {
        let mut overlay = MeasureOverlay::default();
        {
            let mut session = AngleSession::new(MeasureConfig::default(), &mut overlay);
            session.add_point(point(0.0, 0.0, 0.0));
            session.add_point(point(0.0, 0.0, 1.0));
            session.add_point(point(0.0, 1.0, 0.0));
        }

        assert_eq!(overlay.label_text, "90.0°");
    }
}
