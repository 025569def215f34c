use std::f32::consts::{PI, TAU};

/// Wrap an angle into `[0, 2π)`. Negative angles wrap around instead of clamping to zero.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
	let wrapped = angle % TAU;
	let wrapped = if wrapped < 0. { wrapped + TAU } else { wrapped };
	// `-ε % τ + τ` rounds to exactly τ
	if wrapped >= TAU {
		0.
	} else {
		wrapped
	}
}

/// Signed delta from `from` to `to` along the shorter way around the circle, in `[-π, π]`.
#[inline]
pub fn shortest_delta(from: f32, to: f32) -> f32 {
	let mut delta = (to - from) % TAU;
	if delta > PI {
		delta -= TAU;
	} else if delta < -PI {
		delta += TAU;
	}
	delta
}

/// Result of one step of target seeking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
	pub value: f32,
	/// Set once the value snapped onto the target.
	pub arrived: bool,
}

/// `value += delta * smooth_factor * dt`, snapping when `|delta| < tolerance`.
///
/// The step factor is capped at 1 so a long frame can not overshoot the target.
#[inline]
pub fn approach(value: f32, target: f32, delta: f32, smooth_factor: f32, tolerance: f32, dt: f32) -> Approach {
	if delta.abs() < tolerance {
		return Approach {
			value: target,
			arrived: true,
		};
	}

	let factor = (smooth_factor * dt).min(1.);
	let value = value + delta * factor;
	let arrived = factor >= 1.;
	Approach {
		value: if arrived { target } else { value },
		arrived,
	}
}
