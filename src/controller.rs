//! Controllers turning input into smoothed camera motion and character headings.

mod camera;
mod movement;

pub use camera::{CameraController, CameraControllerSettings};
pub use movement::{MovementController, MovementSettings};
