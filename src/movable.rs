use std::collections::VecDeque;

use glam::{vec3, Vec3};
use indextree::NodeId;

use crate::camera::ViewDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
	#[default]
	Idle,
	Moving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationState {
	#[default]
	Idle,
	Walking,
	Falling,
}

impl AnimationState {
	pub fn name(self) -> &'static str {
		match self {
			AnimationState::Idle => "idle",
			AnimationState::Walking => "walk",
			AnimationState::Falling => "fall",
		}
	}
}

/// Default walking speed, world units per second before the level's unit scale.
pub const DEFAULT_SPEED: f32 = 120.;

/// Movement state of a character.
///
/// Two orthogonal state machines live here: `Idle ⇄ Moving`, driven by a heading or a
/// path, and `grounded ⇄ falling`, driven by the physics pass.
#[derive(Debug, Clone)]
pub struct Movable {
	pub velocity: Vec3,
	pub grounded: bool,
	pub speed: f32,
	/// Sprite facing as seen through the camera.
	pub facing: ViewDirection,
	pub(crate) heading: Vec3,
	pub(crate) move_state: MoveState,
	pub(crate) animation: AnimationState,
	pub(crate) state_time: f32,
	pub(crate) path: VecDeque<NodeId>,
}

impl Default for Movable {
	fn default() -> Self {
		Self {
			velocity: Vec3::ZERO,
			grounded: false,
			speed: DEFAULT_SPEED,
			facing: ViewDirection::SouthEast,
			heading: Vec3::ZERO,
			move_state: MoveState::Idle,
			animation: AnimationState::Idle,
			state_time: 0.,
			path: VecDeque::new(),
		}
	}
}

impl Movable {
	/// Normalised ground-plane heading, zero when never set.
	pub fn heading(&self) -> Vec3 {
		self.heading
	}

	pub fn move_state(&self) -> MoveState {
		self.move_state
	}

	pub fn is_moving(&self) -> bool {
		self.move_state == MoveState::Moving
	}

	pub fn animation_state(&self) -> AnimationState {
		self.animation
	}

	/// Seconds spent in the current animation state.
	pub fn state_time(&self) -> f32 {
		self.state_time
	}

	pub fn path(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.path.iter().copied()
	}

	/// Steer by a direction. A non-zero direction cancels any path; a zero one stops
	/// unless a path is still being followed.
	pub fn set_direction(&mut self, direction: Vec3) {
		let heading = vec3(direction.x, 0., direction.z).normalize_or_zero();
		if heading == Vec3::ZERO {
			if self.path.is_empty() {
				self.move_state = MoveState::Idle;
			}
			return;
		}

		self.heading = heading;
		self.path.clear();
		self.move_state = MoveState::Moving;
	}

	/// Walk through `path`, front first. An empty path stops.
	pub fn follow_path(&mut self, path: impl IntoIterator<Item = NodeId>) {
		self.path = path.into_iter().collect();
		self.move_state = if self.path.is_empty() {
			MoveState::Idle
		} else {
			MoveState::Moving
		};
	}

	pub fn stop(&mut self) {
		self.path.clear();
		self.move_state = MoveState::Idle;
		self.velocity.x = 0.;
		self.velocity.z = 0.;
	}

	pub(crate) fn set_heading(&mut self, heading: Vec3) {
		let heading = vec3(heading.x, 0., heading.z).normalize_or_zero();
		if heading != Vec3::ZERO {
			self.heading = heading;
		}
	}

	pub(crate) fn next_waypoint(&self) -> Option<NodeId> {
		self.path.front().copied()
	}

	pub(crate) fn pop_waypoint(&mut self) -> Option<NodeId> {
		self.path.pop_front()
	}

	/// Re-derive the animation state; the state clock restarts whenever it changes.
	pub(crate) fn advance_animation(&mut self, dt: f32) {
		let animation = if !self.grounded {
			AnimationState::Falling
		} else if self.is_moving() {
			AnimationState::Walking
		} else {
			AnimationState::Idle
		};

		if animation == self.animation {
			self.state_time += dt;
		} else {
			self.animation = animation;
			self.state_time = 0.;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn direction_drives_move_state() {
		let mut movable = Movable::default();
		movable.set_direction(vec3(3., 5., 4.));
		assert!(movable.is_moving());
		assert!((movable.heading() - vec3(0.6, 0., 0.8)).length() < 1e-6);

		movable.set_direction(Vec3::ZERO);
		assert_eq!(movable.move_state(), MoveState::Idle);
		// heading is remembered for facing
		assert!((movable.heading() - vec3(0.6, 0., 0.8)).length() < 1e-6);
	}

	#[test]
	fn animation_clock_resets_on_state_change() {
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.advance_animation(0.5);
		movable.advance_animation(0.25);
		assert_eq!(movable.animation_state(), AnimationState::Idle);
		assert_eq!(movable.state_time(), 0.75);

		movable.set_direction(Vec3::X);
		movable.advance_animation(0.1);
		assert_eq!(movable.animation_state(), AnimationState::Walking);
		assert_eq!(movable.state_time(), 0.);

		movable.grounded = false;
		movable.advance_animation(0.1);
		assert_eq!(movable.animation_state(), AnimationState::Falling);
	}
}
