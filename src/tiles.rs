use glam::{vec3, Vec3};
use indextree::NodeId;
use tracing::debug;

use crate::camera::ViewDirection;
use crate::math::matrix::{Matrix2d, Matrix2dFromVecError};
use crate::node::{NodeData, SceneError, SceneGraph, SceneNode, Tile};

/// Fixed-size grid of tile nodes.
///
/// Tile `(row, col)` is centred at `X = (col + ½)·size − offset.x`, `Z = (row + ½)·size − offset.z`.
#[derive(Debug, Clone)]
pub struct TileField {
	tiles: Matrix2d<NodeId>,
	tile_size: f32,
	origin_offset: Vec3,
}

impl TileField {
	pub fn tile_name(row: usize, col: usize) -> String {
		format!("tile_{row}_{col}")
	}

	/// Offset that puts world `(0, 0, 0)` in the centre of a `rows × cols` grid.
	pub fn centered_offset(rows: usize, cols: usize, tile_size: f32) -> Vec3 {
		vec3(cols as f32 * tile_size / 2., 0., rows as f32 * tile_size / 2.)
	}

	/// Create `rows × cols` flat tiles under `parent`, row-major, and wire their neighbors.
	///
	/// Rejects an empty grid and a tile size that is not a positive finite number.
	pub fn generate(
		graph: &mut SceneGraph,
		parent: NodeId,
		rows: usize,
		cols: usize,
		tile_size: f32,
	) -> Result<Self, SceneError> {
		if rows == 0 || cols == 0 {
			return Err(SceneError::EmptyGrid { rows, cols });
		}
		if !(tile_size > 0. && tile_size.is_finite()) {
			return Err(SceneError::InvalidTileSize(tile_size));
		}

		let origin_offset = Self::centered_offset(rows, cols, tile_size);

		let tiles = Matrix2d::try_from_fn(cols, rows, |col, row| {
			let position = tile_center(row, col, tile_size, origin_offset);
			let node = SceneNode::new(Self::tile_name(row, col), position, NodeData::Tile(Tile::new(row, col)));
			graph.add_child(parent, node)
		})?;

		let field = Self {
			tiles,
			tile_size,
			origin_offset,
		};
		field.generate_neighbors(graph);

		debug!("Generated {}x{} tile field", rows, cols);
		Ok(field)
	}

	/// Wrap already created tile nodes, given row-major.
	pub fn from_tiles(
		rows: usize,
		cols: usize,
		tile_size: f32,
		origin_offset: Vec3,
		ids: Vec<NodeId>,
	) -> Result<Self, Matrix2dFromVecError> {
		Ok(Self {
			tiles: Matrix2d::from_vec(cols, rows, ids)?,
			tile_size,
			origin_offset,
		})
	}

	pub fn rows(&self) -> usize {
		self.tiles.height()
	}

	pub fn cols(&self) -> usize {
		self.tiles.width()
	}

	pub fn tile_size(&self) -> f32 {
		self.tile_size
	}

	pub fn origin_offset(&self) -> Vec3 {
		self.origin_offset
	}

	/// Centre of a cell at zero elevation.
	pub fn tile_center(&self, row: usize, col: usize) -> Vec3 {
		tile_center(row, col, self.tile_size, self.origin_offset)
	}

	pub fn tile_at_index(&self, row: usize, col: usize) -> Option<NodeId> {
		self.tiles.get(col, row).copied()
	}

	/// Grid cell containing a world position. Floors towards negative infinity.
	pub fn grid_index_at(&self, position: Vec3) -> Option<(usize, usize)> {
		let col = ((position.x + self.origin_offset.x) / self.tile_size).floor();
		let row = ((position.z + self.origin_offset.z) / self.tile_size).floor();
		if !(col >= 0. && row >= 0.) {
			return None;
		}

		let (row, col) = (row as usize, col as usize);
		self.tiles.contains(col, row).then_some((row, col))
	}

	pub fn tile_at_isometric(&self, position: Vec3) -> Option<NodeId> {
		let (row, col) = self.grid_index_at(position)?;
		self.tile_at_index(row, col)
	}

	/// Cell whose tile contains world `(0, 0, 0)`.
	pub fn origin_index(&self) -> Option<(usize, usize)> {
		self.grid_index_at(Vec3::ZERO)
	}

	pub fn origin_tile(&self) -> Option<NodeId> {
		self.tile_at_isometric(Vec3::ZERO)
	}

	/// Reverse lookup through the tile's own stored index.
	pub fn index_of(&self, graph: &SceneGraph, id: NodeId) -> Option<(usize, usize)> {
		let index = graph.get(id)?.data.as_tile()?.index();
		(self.tile_at_index(index.0, index.1) == Some(id)).then_some(index)
	}

	/// Tiles in row-major order with their indices.
	pub fn iter(&self) -> impl Iterator<Item = (usize, usize, NodeId)> + '_ {
		let cols = self.cols().max(1);
		self.tiles.iter().enumerate().map(move |(i, id)| (i / cols, i % cols, *id))
	}

	/// Point every tile's neighbor slots at the adjacent cells, leaving edge slots empty.
	pub fn generate_neighbors(&self, graph: &mut SceneGraph) {
		for (row, col, id) in self.iter() {
			let mut neighbors = [None; 4];
			for direction in ViewDirection::VALUES {
				let (dr, dc) = direction.grid_offset();
				neighbors[direction.index()] = match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
					(Some(r), Some(c)) => self.tile_at_index(r, c),
					_ => None,
				};
			}

			if let Some(tile) = graph.get_mut(id).and_then(|node| node.data.as_tile_mut()) {
				tile.neighbors = neighbors;
			}
		}
	}
}

fn tile_center(row: usize, col: usize, tile_size: f32, origin_offset: Vec3) -> Vec3 {
	vec3(
		(col as f32 + 0.5) * tile_size - origin_offset.x,
		0.,
		(row as f32 + 0.5) * tile_size - origin_offset.z,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn field(rows: usize, cols: usize, size: f32) -> (SceneGraph, TileField) {
		let mut graph = SceneGraph::new_with_root(SceneNode::new("level", Vec3::ZERO, NodeData::Generic));
		let root = graph.root();
		let tiles = TileField::generate(&mut graph, root, rows, cols, size).unwrap();
		(graph, tiles)
	}

	#[test]
	fn world_origin_is_the_centre_tile() {
		let (graph, tiles) = field(3, 3, 84.);
		let origin = tiles.tile_at_isometric(Vec3::ZERO).unwrap();
		assert_eq!(tiles.origin_index(), Some((1, 1)));
		assert_eq!(Some(origin), tiles.tile_at_index(1, 1));
		assert_eq!(graph.get(origin).unwrap().name(), "tile_1_1");
		assert_eq!(graph.get(origin).unwrap().position(), Vec3::ZERO);
	}

	#[test]
	fn degenerate_grids_are_rejected() {
		let mut graph = SceneGraph::new_with_root(SceneNode::new("level", Vec3::ZERO, NodeData::Generic));
		let root = graph.root();

		for (rows, cols) in [(0, 3), (3, 0)] {
			assert_eq!(
				TileField::generate(&mut graph, root, rows, cols, 10.).err(),
				Some(SceneError::EmptyGrid { rows, cols })
			);
		}
		for size in [0., -4., f32::INFINITY] {
			assert_eq!(
				TileField::generate(&mut graph, root, 2, 2, size).err(),
				Some(SceneError::InvalidTileSize(size))
			);
		}
		assert!(matches!(
			TileField::generate(&mut graph, root, 2, 2, f32::NAN),
			Err(SceneError::InvalidTileSize(size)) if size.is_nan()
		));
		assert_eq!(graph.len(), 1);
	}

	#[test]
	fn out_of_range_lookups_are_none() {
		let (_, tiles) = field(3, 4, 10.);
		assert!(tiles.tile_at_index(3, 0).is_none());
		assert!(tiles.tile_at_index(0, 4).is_none());
		assert!(tiles.tile_at_isometric(vec3(21., 0., 0.)).is_none());
		assert!(tiles.tile_at_isometric(vec3(0., 0., -15.1)).is_none());
		assert!(tiles.tile_at_isometric(vec3(f32::NAN, 0., 0.)).is_none());
	}

	#[test]
	fn negative_coordinates_floor() {
		let (_, tiles) = field(4, 4, 10.);
		// offset is 20, so x = -0.5 sits in column 1, not column 2
		assert_eq!(tiles.grid_index_at(vec3(-0.5, 0., -0.5)), Some((1, 1)));
		assert_eq!(tiles.grid_index_at(vec3(-20., 0., -20.)), Some((0, 0)));
		assert_eq!(tiles.grid_index_at(vec3(-20.01, 0., 0.)), None);
	}

	#[test]
	fn index_reverse_lookup() {
		let (graph, tiles) = field(3, 5, 32.);
		for row in 0..3 {
			for col in 0..5 {
				let id = tiles.tile_at_index(row, col).unwrap();
				assert_eq!(tiles.index_of(&graph, id), Some((row, col)));
				assert_eq!(graph.get(id).unwrap().name(), TileField::tile_name(row, col));
				assert_eq!(tiles.tile_at_isometric(graph.get(id).unwrap().position()), Some(id));
			}
		}
	}

	#[test]
	fn neighbors_are_wired_with_empty_edges() {
		let (graph, tiles) = field(3, 3, 10.);
		let tile = |r, c| tiles.tile_at_index(r, c).unwrap();
		let data = |id| graph.get(id).unwrap().data.as_tile().unwrap().clone();

		let centre = data(tile(1, 1));
		assert_eq!(centre.neighbor(ViewDirection::NorthEast), Some(tile(0, 1)));
		assert_eq!(centre.neighbor(ViewDirection::SouthEast), Some(tile(1, 2)));
		assert_eq!(centre.neighbor(ViewDirection::SouthWest), Some(tile(2, 1)));
		assert_eq!(centre.neighbor(ViewDirection::NorthWest), Some(tile(1, 0)));

		let corner = data(tile(0, 0));
		assert_eq!(corner.neighbor(ViewDirection::NorthEast), None);
		assert_eq!(corner.neighbor(ViewDirection::NorthWest), None);
		assert_eq!(corner.neighbors().count(), 2);
	}
}
