use std::ops::{Deref, DerefMut};

pub use ecolor::Color32;

use emath::Rect;
use enumset::{EnumSet, EnumSetType};

use crate::math::{DMat4, DVec3, DVec4, Vec4Swizzles};

/// Smallest number of triangles in the arc fan
pub const MIN_ARC_SEGMENTS: u32 = 4;
/// Largest number of triangles in the arc fan
pub const MAX_ARC_SEGMENTS: u32 = 128;
/// The default number of triangles in the arc fan
pub const DEFAULT_ARC_SEGMENTS: u32 = 32;
/// The default arc radius in world units
pub const DEFAULT_ARC_RADIUS: f64 = 0.25;
/// The default distance of the label beyond the arc rim, in world units
pub const DEFAULT_LABEL_OFFSET: f64 = 0.05;

/// Configuration of an angle measurement.
///
/// Defines how picked points are turned into rays and how
/// the measurement is visualized.
#[derive(Debug, Copy, Clone)]
pub struct MeasureConfig {
    /// View matrix of the camera the measurement is picked through.
    pub view_matrix: mint::RowMatrix4<f64>,
    /// Projection matrix of the camera the measurement is picked through.
    pub projection_matrix: mint::RowMatrix4<f64>,
    /// Screen area where the model is displayed.
    pub viewport: Rect,
    /// Number of triangles used to approximate the arc.
    /// Clamped to [`MIN_ARC_SEGMENTS`]..=[`MAX_ARC_SEGMENTS`].
    pub arc_segments: u32,
    /// Radius of the arc around the apex, in world units.
    pub arc_radius: f64,
    /// Distance of the label from the arc rim along the bisector, in world units.
    pub label_offset: f64,
    /// Recompute the angle every update while resolved, following
    /// the picked surface if it moves.
    pub live_tracking: bool,
    /// Outputs that are written to the sinks.
    pub outputs: EnumSet<MeasureOutput>,
    /// Visual settings for the measurement.
    pub visuals: MeasureVisuals,
    /// Ratio of window's physical size to logical size.
    pub pixels_per_point: f32,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            view_matrix: DMat4::IDENTITY.into(),
            projection_matrix: DMat4::IDENTITY.into(),
            viewport: Rect::NOTHING,
            arc_segments: DEFAULT_ARC_SEGMENTS,
            arc_radius: DEFAULT_ARC_RADIUS,
            label_offset: DEFAULT_LABEL_OFFSET,
            live_tracking: false,
            outputs: EnumSet::all(),
            visuals: MeasureVisuals::default(),
            pixels_per_point: 1.0,
        }
    }
}

impl MeasureConfig {
    /// Backward vector of the view camera, pointing from the scene toward the viewer
    pub(crate) fn view_back(&self) -> DVec3 {
        DVec4::from(self.view_matrix.z).xyz()
    }

    /// Whether the drawn measurement looks different with the other config
    pub(crate) fn presentation_changed(&self, other: &Self) -> bool {
        self.clamped_arc_segments() != other.clamped_arc_segments()
            || self.arc_radius.to_bits() != other.arc_radius.to_bits()
            || self.label_offset.to_bits() != other.label_offset.to_bits()
            || self.outputs != other.outputs
            || self.visuals != other.visuals
    }

    /// Arc segment count clamped to the supported range
    pub(crate) fn clamped_arc_segments(&self) -> u32 {
        self.arc_segments.clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS)
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct PreparedMeasureConfig {
    config: MeasureConfig,
    /// Combined view-projection matrix
    pub(crate) view_projection: DMat4,
    /// Inverse of the view-projection matrix, used for pointer rays
    pub(crate) inverse_view_projection: DMat4,
}

impl Deref for PreparedMeasureConfig {
    type Target = MeasureConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl DerefMut for PreparedMeasureConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.config
    }
}

impl PreparedMeasureConfig {
    pub(crate) fn from_config(config: MeasureConfig) -> Self {
        let mut prepared = Self::default();
        prepared.update_for_config(config);
        prepared
    }

    pub(crate) fn update_for_config(&mut self, config: MeasureConfig) {
        let projection_matrix = DMat4::from(config.projection_matrix);
        let view_matrix = DMat4::from(config.view_matrix);

        let view_projection = projection_matrix * view_matrix;

        self.config = config;
        self.view_projection = view_projection;
        self.inverse_view_projection = view_projection.inverse();
    }
}

/// Output written by a resolved measurement.
#[derive(Debug, EnumSetType, Hash)]
pub enum MeasureOutput {
    /// Two line segments from the apex to the other points
    Polyline,
    /// Filled arc between the two rays
    ArcMesh,
    /// Text label showing the angle
    Label,
}

/// Controls the visual style of the measurement
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeasureVisuals {
    /// Color of the lines from the apex
    pub line_color: Color32,
    /// Width (thickness) of the lines, in points
    pub line_width: f32,
    /// Fill color of the arc
    pub arc_color: Color32,
    /// Color of the label text
    pub label_color: Color32,
    /// Size of the label text, in points
    pub label_size: f32,
    /// Number of decimals shown in the label
    pub label_decimals: usize,
}

impl Default for MeasureVisuals {
    fn default() -> Self {
        Self {
            line_color: Color32::from_rgb(255, 200, 0),
            line_width: 2.0,
            arc_color: Color32::from_rgba_unmultiplied(255, 200, 0, 90),
            label_color: Color32::WHITE,
            label_size: 14.0,
            label_decimals: 1,
        }
    }
}
