use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::Vec3;

use crate::math::angle::wrap_angle;

/// Coarse 4-way compass bucket, used for camera view, neighbor slots and sprite facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDirection {
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
}

impl ViewDirection {
	pub const VALUES: [ViewDirection; 4] = [
		ViewDirection::NorthEast,
		ViewDirection::SouthEast,
		ViewDirection::SouthWest,
		ViewDirection::NorthWest,
	];

	pub fn index(self) -> usize {
		match self {
			ViewDirection::NorthEast => 0,
			ViewDirection::SouthEast => 1,
			ViewDirection::SouthWest => 2,
			ViewDirection::NorthWest => 3,
		}
	}

	pub fn from_index(index: usize) -> Self {
		Self::VALUES[index % 4]
	}

	/// Quarter-turn bucket of an angle: `[0, π/2)` is NE, `[π/2, π)` is SE and so on.
	pub fn from_angle(angle: f32) -> Self {
		let bucket = (wrap_angle(angle) / FRAC_PI_2) as usize;
		Self::from_index(bucket.min(3))
	}

	/// Bucket of a ground-plane heading. `None` for a heading with no X/Z component.
	pub fn from_heading(heading: Vec3) -> Option<Self> {
		if heading.x.abs() < f32::EPSILON && heading.z.abs() < f32::EPSILON {
			return None;
		}
		Some(Self::from_angle(heading.z.atan2(heading.x)))
	}

	/// Rotate by another bucket, modulo 4.
	pub fn rotated(self, by: ViewDirection) -> Self {
		Self::from_index(self.index() + by.index())
	}

	pub fn opposite(self) -> Self {
		self.rotated(ViewDirection::SouthWest)
	}

	/// Grid step `(row, col)` towards the neighbor in this slot.
	pub fn grid_offset(self) -> (isize, isize) {
		match self {
			ViewDirection::NorthEast => (-1, 0),
			ViewDirection::SouthEast => (0, 1),
			ViewDirection::SouthWest => (1, 0),
			ViewDirection::NorthWest => (0, -1),
		}
	}

	pub fn short_name(self) -> &'static str {
		match self {
			ViewDirection::NorthEast => "ne",
			ViewDirection::SouthEast => "se",
			ViewDirection::SouthWest => "sw",
			ViewDirection::NorthWest => "nw",
		}
	}
}

impl fmt::Display for ViewDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.short_name())
	}
}
