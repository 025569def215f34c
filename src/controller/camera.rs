use std::f32::consts::{FRAC_PI_4, TAU};

use crate::camera::{Camera, DirectionChanged};
use crate::input::{Action, InputState};
use crate::math::angle::{approach, shortest_delta, wrap_angle};

#[derive(Debug, Clone, PartialEq)]
pub struct CameraControllerSettings {
	/// Fraction of the remaining distance covered per second.
	pub smooth_factor: f32,
	/// Distance under which a value snaps onto its target.
	pub tolerance: f32,
	/// Number of discrete rotation stops around the circle.
	pub rotation_steps: u32,
	/// Angle of stop 0.
	pub base_angle: f32,
	/// Multiplier applied per zoom in/out.
	pub zoom_step: f32,
	pub min_zoom: f32,
	pub max_zoom: f32,
}

impl Default for CameraControllerSettings {
	fn default() -> Self {
		Self {
			smooth_factor: 6.,
			tolerance: 0.005,
			rotation_steps: 4,
			base_angle: FRAC_PI_4,
			zoom_step: 1.25,
			min_zoom: 0.25,
			max_zoom: 4.,
		}
	}
}

/// Smoothly moves the camera's rotation and zoom towards targets.
#[derive(Debug, Clone)]
pub struct CameraController {
	pub settings: CameraControllerSettings,
	target_rotation: f32,
	target_zoom: f32,
	step: u32,
	rotating: bool,
	zooming: bool,
}

impl CameraController {
	pub fn new(camera: &Camera, settings: CameraControllerSettings) -> Self {
		let steps = settings.rotation_steps.max(1);
		let interval = TAU / steps as f32;
		let step = (wrap_angle(camera.rotation_z() - settings.base_angle) / interval).round() as u32 % steps;
		let target_zoom = camera.zoom().clamp(settings.min_zoom, settings.max_zoom);

		Self {
			settings,
			target_rotation: camera.rotation_z(),
			target_zoom,
			step,
			rotating: false,
			zooming: target_zoom != camera.zoom(),
		}
	}

	pub fn target_rotation(&self) -> f32 {
		self.target_rotation
	}

	pub fn target_zoom(&self) -> f32 {
		self.target_zoom
	}

	pub fn is_rotating(&self) -> bool {
		self.rotating
	}

	pub fn is_zooming(&self) -> bool {
		self.zooming
	}

	/// Aim at an arbitrary angle. Wrapped into `[0, 2π)`.
	pub fn set_target_rotation(&mut self, angle: f32) {
		self.target_rotation = wrap_angle(angle);
		self.rotating = true;
	}

	/// Aim at a zoom level, clamped into the configured range.
	pub fn set_target_zoom(&mut self, zoom: f32) {
		self.target_zoom = zoom.clamp(self.settings.min_zoom, self.settings.max_zoom);
		self.zooming = true;
	}

	pub fn rotate_left(&mut self) {
		let steps = self.settings.rotation_steps.max(1);
		self.snap_to_step((self.step + steps - 1) % steps);
	}

	pub fn rotate_right(&mut self) {
		let steps = self.settings.rotation_steps.max(1);
		self.snap_to_step((self.step + 1) % steps);
	}

	pub fn zoom_in(&mut self) {
		self.set_target_zoom(self.target_zoom * self.settings.zoom_step);
	}

	pub fn zoom_out(&mut self) {
		self.set_target_zoom(self.target_zoom / self.settings.zoom_step);
	}

	fn snap_to_step(&mut self, step: u32) {
		let interval = TAU / self.settings.rotation_steps.max(1) as f32;
		self.step = step;
		self.set_target_rotation(self.settings.base_angle + step as f32 * interval);
	}

	/// React to this frame's key presses.
	pub fn handle_input(&mut self, input: &InputState) {
		if input.was_pressed(Action::RotateLeft) {
			self.rotate_left();
		}
		if input.was_pressed(Action::RotateRight) {
			self.rotate_right();
		}
		if input.was_pressed(Action::ZoomIn) {
			self.zoom_in();
		}
		if input.was_pressed(Action::ZoomOut) {
			self.zoom_out();
		}
	}

	/// Move the camera one frame closer to its targets.
	///
	/// Rotation takes the shorter way around. Returns the view direction change, if any.
	pub fn update(&mut self, camera: &mut Camera, dt: f32) -> Option<DirectionChanged> {
		let mut change = None;
		let settings = &self.settings;

		if self.rotating {
			let current = camera.rotation_z();
			let delta = shortest_delta(current, self.target_rotation);
			let step = approach(current, self.target_rotation, delta, settings.smooth_factor, settings.tolerance, dt);
			change = camera.set_rotation_z(step.value);
			self.rotating = !step.arrived;
		}

		if self.zooming {
			let current = camera.zoom();
			let delta = self.target_zoom - current;
			let step = approach(current, self.target_zoom, delta, settings.smooth_factor, settings.tolerance, dt);
			camera.set_zoom(step.value);
			self.zooming = !step.arrived;
		}

		change
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::{FRAC_PI_2, PI};

	use super::*;
	use crate::camera::ViewDirection;

	const DT: f32 = 1. / 60.;

	fn settle(controller: &mut CameraController, camera: &mut Camera) -> Vec<DirectionChanged> {
		let mut changes = Vec::new();
		for _ in 0..1000 {
			changes.extend(controller.update(camera, DT));
			if !controller.is_rotating() && !controller.is_zooming() {
				break;
			}
		}
		changes
	}

	#[test]
	fn rotation_snaps_exactly_onto_target() {
		let mut camera = Camera::default();
		camera.set_rotation_z(0.);
		let mut controller = CameraController::new(&camera, CameraControllerSettings::default());

		controller.set_target_rotation(FRAC_PI_2);
		assert!(controller.is_rotating());
		controller.update(&mut camera, DT);
		assert!(camera.rotation_z() > 0. && camera.rotation_z() < FRAC_PI_2);

		let changes = settle(&mut controller, &mut camera);
		assert!(!controller.is_rotating());
		assert_eq!(camera.rotation_z(), FRAC_PI_2);
		assert_eq!(
			changes,
			vec![DirectionChanged {
				from: ViewDirection::NorthEast,
				to: ViewDirection::SouthEast
			}]
		);
	}

	#[test]
	fn rotation_takes_the_short_way_across_zero() {
		let mut camera = Camera::default();
		camera.set_rotation_z(0.2);
		let mut controller = CameraController::new(&camera, CameraControllerSettings::default());

		controller.set_target_rotation(TAU - 0.2);
		controller.update(&mut camera, DT);
		// went backwards through zero, not forward through π
		assert!(camera.rotation_z() < 0.2 || camera.rotation_z() > PI);
		settle(&mut controller, &mut camera);
		assert!((camera.rotation_z() - (TAU - 0.2)).abs() < 1e-5);
	}

	#[test]
	fn discrete_steps_are_quantized() {
		let camera = Camera::default();
		let mut controller = CameraController::new(&camera, CameraControllerSettings::default());

		controller.rotate_right();
		assert!((controller.target_rotation() - 3. * FRAC_PI_4).abs() < 1e-5);
		controller.rotate_left();
		controller.rotate_left();
		assert!((controller.target_rotation() - 7. * FRAC_PI_4).abs() < 1e-5);
	}

	#[test]
	fn zoom_is_clamped_by_the_controller() {
		let mut camera = Camera::default();
		let mut controller = CameraController::new(&camera, CameraControllerSettings::default());

		controller.set_target_zoom(100.);
		assert_eq!(controller.target_zoom(), 4.);
		settle(&mut controller, &mut camera);
		assert_eq!(camera.zoom(), 4.);

		for _ in 0..20 {
			controller.zoom_out();
		}
		assert_eq!(controller.target_zoom(), 0.25);
	}
}
