//! Provides an interactive three-point angle measurement that can be used to inspect 3d models.
//!
//! The user picks the apex of the angle and one point on each of its rays. Once all three
//! points are picked, the angle is computed and visualized with two lines from the apex,
//! a filled arc between them and a text label.
//!
//! # Usage
//!
//! If you are using the [Egui](https://github.com/emilk/egui) library in your application,
//! you will most likely want to use `measure-gizmo-egui`.
//!
//! Alternatively, this library can be easily used with any framework. For interacting with
//! the measurement, give [`AngleSession::update`] information about user interaction in the
//! form of [`MeasureInteraction`], together with a [`PickSurface`] the points are picked from.
//!
//! The results are written into sinks implementing [`PolylineSink`], [`MeshSink`] and
//! [`LabelSink`]. [`MeasureOverlay`] is a ready-made sink whose [`MeasureOverlay::draw`]
//! provides vertices in viewport coordinates that can be easily rendered with your favorite
//! graphics APIs.
//!
//! ```
//! use measure_gizmo::prelude::*;
//!
//! let mut session = AngleSession::<MeasureOverlay>::default();
//!
//! session.add_point(PickedPoint::from_world(DVec3::ZERO));
//! session.add_point(PickedPoint::from_world(DVec3::X));
//! session.add_point(PickedPoint::from_world(DVec3::Y));
//!
//! assert_eq!(session.state(), MeasureState::Resolved);
//! assert_eq!(session.sinks().label_text, "90.0°");
//! ```

mod shape;

pub mod config;
pub mod geometry;
pub mod math;
pub mod overlay;
pub mod picker;
pub mod session;
pub mod sinks;

pub mod prelude;

pub use prelude::*;

pub use enumset::{enum_set, EnumSet};

pub use mint;
