pub use measure_gizmo::prelude::*;

pub use crate::MeasureExt;
