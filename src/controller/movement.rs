use glam::{vec2, vec3, Vec2, Vec3};

use crate::camera::Camera;
use crate::input::{Action, InputState};
use crate::movable::{Movable, DEFAULT_SPEED};

#[derive(Debug, Clone, PartialEq)]
pub struct MovementSettings {
	/// Walking speed given to the steered character.
	pub speed: f32,
}

impl Default for MovementSettings {
	fn default() -> Self {
		Self { speed: DEFAULT_SPEED }
	}
}

/// Turns held movement keys into a world heading for the player character.
///
/// Keys are screen relative: "up" walks away from the viewer whatever the camera rotation.
#[derive(Debug, Clone, Default)]
pub struct MovementController {
	pub settings: MovementSettings,
	steering: bool,
}

impl MovementController {
	pub fn new(settings: MovementSettings) -> Self {
		Self {
			settings,
			steering: false,
		}
	}

	/// Whether movement keys were held on the last [`MovementController::apply`].
	pub fn is_steering(&self) -> bool {
		self.steering
	}

	/// Screen-space direction of the held keys. Screen Y grows downward.
	pub fn screen_direction(input: &InputState) -> Vec2 {
		let axis = |neg, pos| (input.is_held(pos) as i8 - input.is_held(neg) as i8) as f32;
		vec2(
			axis(Action::MoveLeft, Action::MoveRight),
			axis(Action::MoveUp, Action::MoveDown),
		)
	}

	/// Normalised ground-plane heading for the held keys, zero when none are held.
	///
	/// The screen vector is taken back through the camera's isometric inverse, so the
	/// character walks along what the player sees as up, down, left or right.
	pub fn direction(input: &InputState, camera: &Camera) -> Vec3 {
		let screen = Self::screen_direction(input);
		if screen == Vec2::ZERO {
			return Vec3::ZERO;
		}

		let ground = camera.cartesian_to_isometric(screen) - camera.cartesian_to_isometric(Vec2::ZERO);
		vec3(ground.x, 0., ground.y).normalize_or_zero()
	}

	/// Steer `movable` from the held keys. Releasing every key stops a key-driven walk
	/// but leaves a path in progress alone.
	pub fn apply(&mut self, input: &InputState, camera: &Camera, movable: &mut Movable) {
		let direction = Self::direction(input, camera);
		let steering = direction != Vec3::ZERO;

		movable.speed = self.settings.speed;
		if steering || self.steering {
			movable.set_direction(direction);
		}
		self.steering = steering;
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use super::*;
	use crate::input::InputEvent;
	use crate::movable::MoveState;

	fn holding(actions: &[Action]) -> InputState {
		let mut input = InputState::new();
		input.extend(actions.iter().map(|action| InputEvent::KeyDown(*action)));
		input
	}

	fn close(a: Vec3, b: Vec3) -> bool {
		(a - b).length() < 1e-4
	}

	#[test]
	fn keys_follow_the_camera_rotation() {
		let mut camera = Camera::default();
		camera.set_rotation_z(0.);
		let right = holding(&[Action::MoveRight]);
		assert!(close(MovementController::direction(&right, &camera), Vec3::X));

		// a quarter turn makes screen right point down the Z axis the other way
		camera.set_rotation_z(FRAC_PI_2);
		assert!(close(MovementController::direction(&right, &camera), Vec3::NEG_Z));
	}

	#[test]
	fn vertical_keys_undo_the_squash() {
		let mut camera = Camera::default();
		camera.set_rotation_z(0.);
		let down = holding(&[Action::MoveDown]);
		assert!(close(MovementController::direction(&down, &camera), Vec3::Z));

		let diagonal = MovementController::direction(&holding(&[Action::MoveDown, Action::MoveRight]), &camera);
		assert!((diagonal.length() - 1.).abs() < 1e-5);
		// squashed screen Y means a screen diagonal is steeper on the ground
		assert!(diagonal.z > diagonal.x);
	}

	#[test]
	fn releasing_keys_stops_key_walks_only() {
		let camera = Camera::default();
		let mut controller = MovementController::default();
		let mut movable = Movable::default();

		controller.apply(&holding(&[Action::MoveUp]), &camera, &mut movable);
		assert!(controller.is_steering());
		assert_eq!(movable.move_state(), MoveState::Moving);

		controller.apply(&InputState::new(), &camera, &mut movable);
		assert!(!controller.is_steering());
		assert_eq!(movable.move_state(), MoveState::Idle);

		// no keys held on either frame, so a path walk is left running
		movable.follow_path([indextree::Arena::<()>::new().new_node(())]);
		controller.apply(&InputState::new(), &camera, &mut movable);
		assert_eq!(movable.move_state(), MoveState::Moving);
	}
}
