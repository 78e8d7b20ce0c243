pub use crate::config::{MeasureConfig, MeasureOutput, MeasureVisuals};
pub use crate::geometry::{compute_angle, AngleError, AngleResult, ArcParams};
pub use crate::overlay::{LabelDrawData, MeasureDrawData, MeasureOverlay};
pub use crate::picker::{
    PickSurface, PickedPoint, PlaneSurface, PointPicker, Ray, RayHit, Surface, TriangleSurface,
};
pub use crate::session::{AngleSession, MeasureInteraction, MeasureState, PickOutcome, PickSequence};
pub use crate::sinks::{LabelSink, MeasureSinks, MeshSink, PolylineSink, SinkSet};

pub use ecolor::Color32;
pub use emath::{Pos2, Rect};
pub use glam::{DMat4, DVec3};
