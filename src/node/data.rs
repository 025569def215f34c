use std::collections::BTreeMap;

use indextree::NodeId;

use crate::camera::ViewDirection;
use crate::movable::Movable;

/// Grid cell of the level.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
	pub row: usize,
	pub col: usize,
	/// Indexed by [`ViewDirection::index`]. Empty at the grid edges.
	pub(crate) neighbors: [Option<NodeId>; 4],
}

impl Tile {
	pub fn new(row: usize, col: usize) -> Self {
		Self {
			row,
			col,
			neighbors: [None; 4],
		}
	}

	pub fn index(&self) -> (usize, usize) {
		(self.row, self.col)
	}

	pub fn neighbor(&self, direction: ViewDirection) -> Option<NodeId> {
		self.neighbors[direction.index()]
	}

	pub fn neighbors(&self) -> impl Iterator<Item = (ViewDirection, NodeId)> + '_ {
		ViewDirection::VALUES
			.into_iter()
			.filter_map(|dir| Some((dir, self.neighbors[dir.index()]?)))
	}
}

/// Anything that walks around the level.
#[derive(Debug, Clone, Default)]
pub struct Character {
	pub movable: Movable,
	pub inventory: BTreeMap<String, u32>,
}

/// Item lying on a tile, picked up by the first character that steps on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumable {
	pub item: String,
	pub amount: u32,
}

#[derive(Debug, Clone, Default)]
pub enum NodeData {
	#[default]
	Generic,
	Tile(Tile),
	Character(Character),
	Consumable(Consumable),
}

impl NodeData {
	pub fn is_generic(&self) -> bool {
		matches!(self, NodeData::Generic)
	}

	pub fn is_tile(&self) -> bool {
		matches!(self, NodeData::Tile(_))
	}

	pub fn is_character(&self) -> bool {
		matches!(self, NodeData::Character(_))
	}

	pub fn is_consumable(&self) -> bool {
		matches!(self, NodeData::Consumable(_))
	}

	pub fn as_tile(&self) -> Option<&Tile> {
		match self {
			NodeData::Tile(tile) => Some(tile),
			_ => None,
		}
	}

	pub fn as_tile_mut(&mut self) -> Option<&mut Tile> {
		match self {
			NodeData::Tile(tile) => Some(tile),
			_ => None,
		}
	}

	pub fn as_character(&self) -> Option<&Character> {
		match self {
			NodeData::Character(character) => Some(character),
			_ => None,
		}
	}

	pub fn as_character_mut(&mut self) -> Option<&mut Character> {
		match self {
			NodeData::Character(character) => Some(character),
			_ => None,
		}
	}

	pub fn as_consumable(&self) -> Option<&Consumable> {
		match self {
			NodeData::Consumable(consumable) => Some(consumable),
			_ => None,
		}
	}

	pub fn kind_name(&self) -> &'static str {
		match self {
			NodeData::Generic => "Node",
			NodeData::Tile(_) => "Tile",
			NodeData::Character(_) => "Character",
			NodeData::Consumable(_) => "Consumable",
		}
	}
}
