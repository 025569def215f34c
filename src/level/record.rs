use std::collections::BTreeMap;

use glam::Vec3;

/// Plain data shape of a level, as exchanged with the asset loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRecord {
	pub rows: usize,
	pub cols: usize,
	pub tile_size: f32,
	/// Row-major.
	pub tiles: Vec<TileRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
	pub name: String,
	pub position: Vec3,
	pub drawable: Option<String>,
	pub active: bool,
	pub children: Vec<ObjectRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
	pub name: String,
	pub kind: ObjectKind,
	pub position: Vec3,
	pub drawable: Option<String>,
	pub active: bool,
	pub children: Vec<ObjectRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
	Node,
	Character { inventory: BTreeMap<String, u32> },
	Consumable { item: String, amount: u32 },
}

impl ObjectKind {
	pub fn name(&self) -> &'static str {
		match self {
			ObjectKind::Node => "Node",
			ObjectKind::Character { .. } => "Character",
			ObjectKind::Consumable { .. } => "Consumable",
		}
	}
}
