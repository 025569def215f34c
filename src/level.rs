//! The level: tile field, characters, camera and the per-frame update pass.

mod draw;
pub mod record;

use std::collections::BTreeMap;

use glam::{vec3, Vec3};
use indextree::NodeId;
use tracing::{debug, info, warn};

use crate::camera::{Camera, DirectionChanged, ViewDirection};
use crate::controller::{CameraController, CameraControllerSettings, MovementController, MovementSettings};
use crate::event::Signal;
use crate::formats::{LevelParseError, LevelParseResult};
use crate::input::InputState;
use crate::movable::Movable;
use crate::node::{Character, Consumable, NodeData, NodeEvent, SceneError, SceneGraph, SceneNode, Tile};
use crate::pathfinding::find_path;
use crate::physics::LevelPhysics;
use crate::tiles::TileField;

use record::{LevelRecord, ObjectKind, ObjectRecord, TileRecord};

pub use draw::DrawItem;

const ROOT_NAME: &str = "level";

/// Owns everything in a level and steps it frame by frame.
pub struct LevelManager {
	graph: SceneGraph,
	tiles: TileField,
	camera: Camera,
	pub camera_controller: CameraController,
	pub movement_controller: MovementController,
	pub physics: LevelPhysics,
	characters: BTreeMap<String, NodeId>,
	player: Option<NodeId>,
}

impl LevelManager {
	/// Flat `rows × cols` level centred on the world origin.
	///
	/// Fails on an empty grid or a tile size that is not positive and finite.
	pub fn new(rows: usize, cols: usize, tile_size: f32) -> Result<Self, SceneError> {
		let mut graph = SceneGraph::new_with_root(SceneNode::new(ROOT_NAME, Vec3::ZERO, NodeData::Generic));
		let root = graph.root();
		let tiles = TileField::generate(&mut graph, root, rows, cols, tile_size)?;
		graph.drain_events();

		info!("Created {}x{} level", rows, cols);
		Ok(Self::from_parts(graph, tiles))
	}

	fn from_parts(graph: SceneGraph, tiles: TileField) -> Self {
		let camera = Camera::default();
		let camera_controller = CameraController::new(&camera, CameraControllerSettings::default());

		let mut level = Self {
			graph,
			tiles,
			camera,
			camera_controller,
			movement_controller: MovementController::new(MovementSettings::default()),
			physics: LevelPhysics::default(),
			characters: BTreeMap::new(),
			player: None,
		};
		level.characters = level
			.graph
			.iter()
			.filter(|(_, node)| node.data.is_character())
			.map(|(id, node)| (node.name().to_owned(), id))
			.collect();
		level
	}

	/// Build a level from plain data. Tiles are taken row-major; the origin offset is
	/// recovered from the first tile's position.
	pub fn from_record(record: &LevelRecord) -> LevelParseResult<Self> {
		let (rows, cols) = (record.rows, record.cols);
		if rows == 0 || cols == 0 {
			return Err(LevelParseError::EmptyGrid { rows, cols });
		}
		if !(record.tile_size > 0. && record.tile_size.is_finite()) {
			return Err(LevelParseError::InvalidTileSize(record.tile_size));
		}
		if record.tiles.len() != rows * cols {
			return Err(LevelParseError::TileCountMismatch {
				expected: rows * cols,
				got: record.tiles.len(),
			});
		}

		let mut graph = SceneGraph::new_with_root(SceneNode::new(ROOT_NAME, Vec3::ZERO, NodeData::Generic));
		let root = graph.root();

		let mut ids = Vec::with_capacity(record.tiles.len());
		for (i, tile) in record.tiles.iter().enumerate() {
			let data = NodeData::Tile(Tile::new(i / cols, i % cols));
			let mut node = SceneNode::new(tile.name.as_str(), tile.position, data).with_active(tile.active);
			node.drawable = tile.drawable.clone();

			let id = graph.add_child(root, node)?;
			for child in &tile.children {
				add_object(&mut graph, id, child)?;
			}
			ids.push(id);
		}

		let first = record.tiles[0].position;
		let half = record.tile_size / 2.;
		let origin_offset = vec3(half - first.x, 0., half - first.z);
		let tiles = TileField::from_tiles(rows, cols, record.tile_size, origin_offset, ids)?;
		tiles.generate_neighbors(&mut graph);

		// construction events are not pickups
		graph.drain_events();
		Ok(Self::from_parts(graph, tiles))
	}

	/// Plain data snapshot of the level, tiles row-major.
	pub fn to_record(&self) -> LevelRecord {
		let tiles = self
			.tiles
			.iter()
			.filter_map(|(_, _, id)| {
				let node = self.graph.get(id)?;
				Some(TileRecord {
					name: node.name().to_owned(),
					position: node.position(),
					drawable: node.drawable.clone(),
					active: node.active,
					children: self.object_records(id),
				})
			})
			.collect();

		LevelRecord {
			rows: self.tiles.rows(),
			cols: self.tiles.cols(),
			tile_size: self.tiles.tile_size(),
			tiles,
		}
	}

	fn object_records(&self, parent: NodeId) -> Vec<ObjectRecord> {
		self.graph
			.children(parent)
			.into_iter()
			.filter_map(|id| {
				let node = self.graph.get(id)?;
				let kind = match &node.data {
					NodeData::Character(character) => ObjectKind::Character {
						inventory: character.inventory.clone(),
					},
					NodeData::Consumable(consumable) => ObjectKind::Consumable {
						item: consumable.item.clone(),
						amount: consumable.amount,
					},
					NodeData::Generic | NodeData::Tile(_) => ObjectKind::Node,
				};
				Some(ObjectRecord {
					name: node.name().to_owned(),
					kind,
					position: node.position(),
					drawable: node.drawable.clone(),
					active: node.active,
					children: self.object_records(id),
				})
			})
			.collect()
	}

	pub fn graph(&self) -> &SceneGraph {
		&self.graph
	}

	/// Direct graph access. Characters added or removed this way are not tracked by name.
	pub fn graph_mut(&mut self) -> &mut SceneGraph {
		&mut self.graph
	}

	pub fn tiles(&self) -> &TileField {
		&self.tiles
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub fn camera_mut(&mut self) -> &mut Camera {
		&mut self.camera
	}

	/// Attach/detach listeners of the scene graph.
	pub fn node_events(&mut self) -> &mut Signal<NodeEvent> {
		self.graph.node_events()
	}

	/// View direction listeners of the camera.
	pub fn direction_changed(&mut self) -> &mut Signal<DirectionChanged> {
		self.camera.direction_changed()
	}

	fn tile(&self, row: usize, col: usize) -> Result<NodeId, SceneError> {
		self.tiles.tile_at_index(row, col).ok_or(SceneError::NoSuchTile(row, col))
	}

	/// Place a new character on the centre of a tile. It falls onto it on the next update.
	pub fn spawn_character(&mut self, name: &str, row: usize, col: usize) -> Result<NodeId, SceneError> {
		let tile = self.tile(row, col)?;
		let position = self.graph.get(tile).map(|node| node.position()).unwrap_or_default();

		let mut movable = Movable::default();
		movable.facing = self.camera.relative_view_direction(movable.facing);
		let character = Character {
			movable,
			..Default::default()
		};

		let id = self.graph.add_child(tile, SceneNode::new(name, position, NodeData::Character(character)))?;
		self.characters.insert(name.to_owned(), id);
		info!("Spawned character {:?} at ({}, {})", name, row, col);
		Ok(id)
	}

	pub fn spawn_consumable(
		&mut self,
		name: &str,
		item: &str,
		amount: u32,
		row: usize,
		col: usize,
	) -> Result<NodeId, SceneError> {
		let tile = self.tile(row, col)?;
		let position = self.graph.get(tile).map(|node| node.position()).unwrap_or_default();
		let data = NodeData::Consumable(Consumable {
			item: item.to_owned(),
			amount,
		});

		let id = self.graph.add_child(tile, SceneNode::new(name, position, data))?;
		info!("Spawned {} x{} at ({}, {})", item, amount, row, col);
		Ok(id)
	}

	/// Remove a character and everything it carries. `false` if there is none by that name.
	pub fn remove_character(&mut self, name: &str) -> bool {
		let Some(id) = self.characters.remove(name) else {
			return false;
		};
		if self.player == Some(id) {
			self.player = None;
		}
		self.graph.remove(id)
	}

	pub fn character(&self, name: &str) -> Option<NodeId> {
		self.characters.get(name).copied()
	}

	/// Character names in order.
	pub fn characters(&self) -> impl Iterator<Item = (&str, NodeId)> {
		self.characters.iter().map(|(name, id)| (name.as_str(), *id))
	}

	/// Character driven by the input. `false` if there is none by that name.
	pub fn set_player(&mut self, name: &str) -> bool {
		match self.characters.get(name) {
			Some(id) => {
				self.player = Some(*id);
				true
			}
			None => false,
		}
	}

	pub fn player(&self) -> Option<NodeId> {
		self.player
	}

	fn movable_mut(&mut self, id: NodeId) -> Option<&mut Movable> {
		Some(&mut self.graph.get_mut(id)?.data.as_character_mut()?.movable)
	}

	/// Send a character walking to `destination` through active tiles it can climb.
	///
	/// `false` if either end is not a tile or no route exists; the character keeps what it was doing.
	pub fn move_to_node(&mut self, character: NodeId, destination: NodeId) -> bool {
		let Some(start) = self.graph.parent(character) else {
			return false;
		};
		if !self.graph.get(start).is_some_and(|node| node.data.is_tile()) {
			return false;
		}

		let path = if start == destination {
			vec![destination]
		} else {
			find_path(&self.graph, start, destination, self.physics.step_height)
		};
		if path.is_empty() {
			warn!("No path from {:?} to {:?}", start, destination);
			return false;
		}

		debug!("Character {:?} walking {} tiles", character, path.len());
		match self.movable_mut(character) {
			Some(movable) => {
				movable.follow_path(path);
				true
			}
			None => false,
		}
	}

	/// Move a tile, and everything on it, to a new elevation.
	pub fn set_tile_elevation(&mut self, row: usize, col: usize, elevation: f32) -> bool {
		let Some(id) = self.tiles.tile_at_index(row, col) else {
			return false;
		};
		let Some(current) = self.graph.get(id).map(|node| node.elevation()) else {
			return false;
		};
		self.graph.translate(id, vec3(0., elevation - current, 0.))
	}

	/// Switch a tile on or off. Objects fall through inactive tiles.
	pub fn set_tile_active(&mut self, row: usize, col: usize, active: bool) -> bool {
		let Some(node) = self.tiles.tile_at_index(row, col).and_then(|id| self.graph.get_mut(id)) else {
			return false;
		};
		node.active = active;
		true
	}

	/// Advance the level by `dt` seconds.
	///
	/// Order: input, character physics, deferred graph reactions, camera smoothing.
	pub fn update(&mut self, dt: f32, input: &InputState) {
		self.handle_input(input);

		let ids: Vec<NodeId> = self.characters.values().copied().collect();
		for id in &ids {
			if let Some(report) = self.physics.step(&mut self.graph, &self.tiles, *id, dt) {
				if report.landed {
					debug!("Character {:?} landed", id);
				}
			}
		}

		for event in self.graph.drain_events() {
			if let NodeEvent::ChildAttached { parent, child } = event {
				self.pick_up(parent, child);
			}
		}

		if self.camera_controller.update(&mut self.camera, dt).is_some() {
			debug!("Refreshing facing for {} characters", ids.len());
		}
		self.refresh_facing(&ids);
	}

	fn handle_input(&mut self, input: &InputState) {
		self.camera_controller.handle_input(input);

		let Some(player) = self.player else {
			return;
		};

		for click in input.clicks() {
			let ground = self.camera.screen_to_isometric(*click);
			if let Some(tile) = self.tiles.tile_at_isometric(vec3(ground.x, 0., ground.y)) {
				self.move_to_node(player, tile);
			}
		}

		if let Some(character) = self.graph.get_mut(player).and_then(|node| node.data.as_character_mut()) {
			self.movement_controller.apply(input, &self.camera, &mut character.movable);
		}
	}

	/// A character arriving on a tile collects every consumable lying there.
	fn pick_up(&mut self, tile: NodeId, character: NodeId) {
		let is_character = self.graph.get(character).is_some_and(|node| node.data.is_character());
		let is_tile = self.graph.get(tile).is_some_and(|node| node.data.is_tile());
		if !is_character || !is_tile {
			return;
		}

		let items: Vec<(NodeId, Consumable)> = self
			.graph
			.children(tile)
			.into_iter()
			.filter_map(|id| Some((id, self.graph.get(id)?.data.as_consumable()?.clone())))
			.collect();

		for (id, consumable) in items {
			self.graph.remove(id);
			if let Some(character) = self.graph.get_mut(character).and_then(|node| node.data.as_character_mut()) {
				*character.inventory.entry(consumable.item.clone()).or_default() += consumable.amount;
			}
			debug!("Picked up {} x{}", consumable.item, consumable.amount);
		}
	}

	/// Facing follows the heading as seen from the current view direction.
	fn refresh_facing(&mut self, ids: &[NodeId]) {
		let view = self.camera.view_direction();
		for id in ids {
			if let Some(movable) = self.movable_mut(*id) {
				if let Some(heading) = ViewDirection::from_heading(movable.heading()) {
					movable.facing = heading.rotated(view);
				}
			}
		}
	}
}

fn add_object(graph: &mut SceneGraph, parent: NodeId, record: &ObjectRecord) -> Result<NodeId, SceneError> {
	let data = match &record.kind {
		ObjectKind::Node => NodeData::Generic,
		ObjectKind::Character { inventory } => NodeData::Character(Character {
			inventory: inventory.clone(),
			..Default::default()
		}),
		ObjectKind::Consumable { item, amount } => NodeData::Consumable(Consumable {
			item: item.clone(),
			amount: *amount,
		}),
	};

	let mut node = SceneNode::new(record.name.as_str(), record.position, data).with_active(record.active);
	node.drawable = record.drawable.clone();

	let id = graph.add_child(parent, node)?;
	for child in &record.children {
		add_object(graph, id, child)?;
	}
	Ok(id)
}
