pub mod data;
pub mod tree;

use glam::{Vec2, Vec3};

pub use data::{Character, Consumable, NodeData, Tile};
pub use indextree::NodeId;
pub use tree::{NodeEvent, SceneError, SceneGraph};

/// Spatial unit of the level. Tiles and every object standing on them are scene nodes.
///
/// `position` is in world space, not relative to the parent. Children start out
/// where their parent is and move along with it through [`SceneGraph::translate`].
#[derive(Debug, Clone)]
pub struct SceneNode {
	name: String,
	pub(crate) position: Vec3,
	/// Last projected screen position. Refreshed by the draw pass, never read back into the simulation.
	pub screen_position: Vec2,
	pub scale: Vec2,
	pub rotation: f32,
	pub tint: Vec3,
	/// Inactive tiles do not carry anything: objects fall through them.
	pub active: bool,
	pub drawable: Option<String>,
	pub data: NodeData,
}

impl SceneNode {
	pub fn new(name: impl Into<String>, position: Vec3, data: NodeData) -> Self {
		Self {
			name: name.into(),
			position,
			screen_position: Vec2::ZERO,
			scale: Vec2::ONE,
			rotation: 0.,
			tint: Vec3::ONE,
			active: true,
			drawable: None,
			data,
		}
	}

	pub fn with_drawable(mut self, drawable: impl Into<String>) -> Self {
		self.drawable = Some(drawable.into());
		self
	}

	pub fn with_active(mut self, active: bool) -> Self {
		self.active = active;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn position(&self) -> Vec3 {
		self.position
	}

	/// Elevation, growing downward.
	pub fn elevation(&self) -> f32 {
		self.position.y
	}
}
