mod direction;

use std::f32::consts::{FRAC_PI_4, FRAC_PI_6};

use glam::{vec2, vec3, Mat4, Vec2, Vec3};
use tracing::debug;

use crate::event::Signal;
use crate::math::angle::wrap_angle;

pub use direction::ViewDirection;

/// Raised when the camera rotation crosses into another quarter-turn bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionChanged {
	pub from: ViewDirection,
	pub to: ViewDirection,
}

/// Isometric camera.
///
/// Converts between three spaces:
/// - isometric world space: `Vec3`, X/Z on the ground plane, Y the elevation (growing downward on screen),
/// - cartesian draw space: the ground plane rotated around the isometric origin and squashed by `scale_y`,
/// - screen space: cartesian space zoomed, panned by `position` and centred on `origin`.
pub struct Camera {
	rotation_z: f32,
	rotation_x: f32,
	zoom: f32,
	position: Vec2,
	origin: Vec2,
	isometric_origin: Vec2,

	scale_y: f32,
	view_direction: ViewDirection,

	cartesian: Mat4,
	cartesian_inverse: Mat4,
	isometric: Mat4,
	isometric_inverse: Mat4,

	direction_changed: Signal<DirectionChanged>,
}

impl Default for Camera {
	fn default() -> Self {
		let mut camera = Self {
			rotation_z: FRAC_PI_4,
			rotation_x: FRAC_PI_6,
			zoom: 1.,
			position: Vec2::ZERO,
			origin: Vec2::ZERO,
			isometric_origin: Vec2::ZERO,
			scale_y: 1. - FRAC_PI_6.sin(),
			view_direction: ViewDirection::from_angle(FRAC_PI_4),
			cartesian: Mat4::IDENTITY,
			cartesian_inverse: Mat4::IDENTITY,
			isometric: Mat4::IDENTITY,
			isometric_inverse: Mat4::IDENTITY,
			direction_changed: Signal::new(),
		};
		camera.update();
		camera
	}
}

impl Camera {
	pub fn new(origin: Vec2) -> Self {
		let mut camera = Self::default();
		camera.set_origin(origin);
		camera
	}

	pub fn rotation_z(&self) -> f32 {
		self.rotation_z
	}

	pub fn rotation_x(&self) -> f32 {
		self.rotation_x
	}

	pub fn zoom(&self) -> f32 {
		self.zoom
	}

	pub fn position(&self) -> Vec2 {
		self.position
	}

	pub fn origin(&self) -> Vec2 {
		self.origin
	}

	pub fn isometric_origin(&self) -> Vec2 {
		self.isometric_origin
	}

	/// Vertical squash of the ground plane, `1 - sin(rotation_x)`.
	pub fn scale_y(&self) -> f32 {
		self.scale_y
	}

	pub fn view_direction(&self) -> ViewDirection {
		self.view_direction
	}

	pub fn cartesian_matrix(&self) -> Mat4 {
		self.cartesian
	}

	pub fn isometric_matrix(&self) -> Mat4 {
		self.isometric
	}

	/// Listeners for view direction changes. Called synchronously from [`Camera::set_rotation_z`].
	pub fn direction_changed(&mut self) -> &mut Signal<DirectionChanged> {
		&mut self.direction_changed
	}

	/// Set the rotation around the vertical axis, wrapped into `[0, 2π)`.
	///
	/// Returns the change if the quarter-turn bucket moved, after notifying listeners.
	pub fn set_rotation_z(&mut self, angle: f32) -> Option<DirectionChanged> {
		self.rotation_z = wrap_angle(angle);
		self.update();

		let direction = ViewDirection::from_angle(self.rotation_z);
		if direction == self.view_direction {
			return None;
		}

		let change = DirectionChanged {
			from: self.view_direction,
			to: direction,
		};
		self.view_direction = direction;
		debug!("Camera view direction {} -> {}", change.from, change.to);
		self.direction_changed.emit(&change);
		Some(change)
	}

	pub fn set_rotation_x(&mut self, angle: f32) {
		self.rotation_x = angle;
		self.scale_y = 1. - angle.sin();
		self.update();
	}

	/// Stored as given. Limits are the controller's business.
	pub fn set_zoom(&mut self, zoom: f32) {
		self.zoom = zoom;
		self.update();
	}

	pub fn set_position(&mut self, position: Vec2) {
		self.position = position;
		self.update();
	}

	pub fn set_origin(&mut self, origin: Vec2) {
		self.origin = origin;
		self.update();
	}

	/// Ground-plane pivot `(X, Z)` the view rotates around.
	pub fn set_isometric_origin(&mut self, isometric_origin: Vec2) {
		self.isometric_origin = isometric_origin;
		self.update();
	}

	/// Recompute both transforms and their inverses from the current state.
	pub fn update(&mut self) {
		self.cartesian = Mat4::from_translation(self.origin.extend(0.))
			* Mat4::from_translation(-self.position.extend(0.))
			* Mat4::from_scale(vec3(self.zoom, self.zoom, 1.));
		self.cartesian_inverse = self.cartesian.inverse();

		self.isometric = Mat4::from_scale(vec3(1., self.scale_y, 1.))
			* Mat4::from_rotation_z(self.rotation_z)
			* Mat4::from_translation(-self.isometric_origin.extend(0.));
		self.isometric_inverse = self.isometric.inverse();
	}

	/// Project a world position into cartesian draw space. Elevation shifts the result
	/// vertically by `Y * scale_y`.
	pub fn isometric_to_cartesian(&self, position: Vec3) -> Vec2 {
		let ground = self.isometric.transform_point3(vec3(position.x, position.z, 0.));
		vec2(ground.x, ground.y + position.y * self.scale_y)
	}

	/// Ground-plane `(X, Z)` under a cartesian point.
	pub fn cartesian_to_isometric(&self, cartesian: Vec2) -> Vec2 {
		let ground = self.isometric_inverse.transform_point3(cartesian.extend(0.));
		vec2(ground.x, ground.y)
	}

	pub fn cartesian_to_screen(&self, cartesian: Vec2) -> Vec2 {
		self.cartesian.transform_point3(cartesian.extend(0.)).truncate()
	}

	pub fn screen_to_cartesian(&self, screen: Vec2) -> Vec2 {
		self.cartesian_inverse.transform_point3(screen.extend(0.)).truncate()
	}

	pub fn isometric_to_screen(&self, position: Vec3) -> Vec2 {
		self.cartesian_to_screen(self.isometric_to_cartesian(position))
	}

	/// Ground-plane `(X, Z)` under a screen point, assuming zero elevation.
	///
	/// Goes through the cartesian inverse first, then the isometric inverse.
	pub fn screen_to_isometric(&self, screen: Vec2) -> Vec2 {
		self.cartesian_to_isometric(self.screen_to_cartesian(screen))
	}

	/// A compass direction as seen from the current view bucket.
	pub fn relative_view_direction(&self, direction: ViewDirection) -> ViewDirection {
		direction.rotated(self.view_direction)
	}
}
