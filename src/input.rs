//! Resolved input, handed to the level every frame instead of polled globally.

use std::collections::HashSet;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
	MoveUp,
	MoveDown,
	MoveLeft,
	MoveRight,
	RotateLeft,
	RotateRight,
	ZoomIn,
	ZoomOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
	KeyDown(Action),
	KeyUp(Action),
	/// Click at a screen position.
	MouseClick(Vec2),
}

/// Held keys, presses since the last frame and clicks since the last frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
	held: HashSet<Action>,
	pressed: HashSet<Action>,
	clicks: Vec<Vec2>,
}

impl InputState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn apply(&mut self, event: InputEvent) {
		match event {
			InputEvent::KeyDown(action) => {
				// key repeat is not a new press
				if self.held.insert(action) {
					self.pressed.insert(action);
				}
			}
			InputEvent::KeyUp(action) => {
				self.held.remove(&action);
			}
			InputEvent::MouseClick(position) => self.clicks.push(position),
		}
	}

	pub fn is_held(&self, action: Action) -> bool {
		self.held.contains(&action)
	}

	/// Whether `action` went down since the last [`InputState::end_frame`].
	pub fn was_pressed(&self, action: Action) -> bool {
		self.pressed.contains(&action)
	}

	pub fn clicks(&self) -> &[Vec2] {
		&self.clicks
	}

	/// Forget per-frame edges. Held keys stay held.
	pub fn end_frame(&mut self) {
		self.pressed.clear();
		self.clicks.clear();
	}
}

impl Extend<InputEvent> for InputState {
	fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, events: T) {
		for event in events {
			self.apply(event);
		}
	}
}
