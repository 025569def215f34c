use glam::{Vec2, Vec3};
use indextree::NodeId;

use super::LevelManager;
use crate::camera::ViewDirection;
use crate::movable::AnimationState;

/// Everything a renderer needs to paint one node.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
	pub node: NodeId,
	pub position: Vec3,
	/// Screen position with the elevation offset applied.
	pub screen_position: Vec2,
	pub tint: Vec3,
	pub rotation: f32,
	pub scale: Vec2,
	pub drawable: Option<String>,
	/// Animation state and sprite facing, for characters.
	pub animation: Option<(AnimationState, ViewDirection)>,
}

fn ascending(n: usize) -> Box<dyn Iterator<Item = usize>> {
	Box::new(0..n)
}

fn descending(n: usize) -> Box<dyn Iterator<Item = usize>> {
	Box::new((0..n).rev())
}

impl LevelManager {
	/// Grid cells back to front for the current view direction.
	pub fn traversal_order(&self) -> Vec<(usize, usize)> {
		let (rows, cols) = (self.tiles.rows(), self.tiles.cols());
		let (rows_up, cols_up) = match self.camera.view_direction() {
			ViewDirection::NorthEast => (true, true),
			ViewDirection::SouthEast => (false, true),
			ViewDirection::SouthWest => (false, false),
			ViewDirection::NorthWest => (true, false),
		};

		let row_iter = if rows_up { ascending(rows) } else { descending(rows) };
		row_iter
			.flat_map(|row| {
				let col_iter = if cols_up { ascending(cols) } else { descending(cols) };
				col_iter.map(move |col| (row, col))
			})
			.collect()
	}

	/// Painter's order draw list: each tile, then everything standing on it.
	///
	/// Refreshes every visited node's cached screen position. Inactive nodes are skipped,
	/// but whatever they carry is still drawn.
	pub fn draw_list(&mut self) -> Vec<DrawItem> {
		let mut items = Vec::new();

		for (row, col) in self.traversal_order() {
			let Some(tile) = self.tiles.tile_at_index(row, col) else {
				continue;
			};

			let ids = std::iter::once(tile).chain(self.graph.descendants(tile));
			for id in ids.collect::<Vec<_>>() {
				let Some(node) = self.graph.get_mut(id) else {
					continue;
				};
				node.screen_position = self.camera.isometric_to_screen(node.position);
				if !node.active {
					continue;
				}

				let animation = node
					.data
					.as_character()
					.map(|character| (character.movable.animation_state(), character.movable.facing));
				items.push(DrawItem {
					node: id,
					position: node.position,
					screen_position: node.screen_position,
					tint: node.tint,
					rotation: node.rotation,
					scale: node.scale,
					drawable: node.drawable.clone(),
					animation,
				});
			}
		}

		items
	}
}
