//! Per-frame movement integration for characters: steering, gravity, step-up
//! blocking, tile re-parenting, landing and respawn.

use glam::{vec2, vec3, Vec3};
use indextree::NodeId;
use tracing::{debug, trace, warn};

use crate::movable::Movable;
use crate::node::SceneGraph;
use crate::tiles::TileField;

/// Global physics parameters for the level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPhysics {
	/// World units per simulation unit. Scales every velocity and the gravity.
	pub unit_scale: f32,
	/// Downward acceleration. Elevation grows downward, so this is positive.
	pub gravity: f32,
	/// Highest rise a character can walk onto.
	pub step_height: f32,
	/// Elevation past which a falling character is respawned.
	pub max_depth: f32,
	/// Respawn cell. Falls back to the tile holding the world origin.
	pub respawn: Option<(usize, usize)>,
}

impl Default for LevelPhysics {
	fn default() -> Self {
		Self {
			unit_scale: 1.,
			gravity: 980.,
			step_height: 24.,
			max_depth: 2000.,
			respawn: None,
		}
	}
}

/// What happened to a character during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
	/// Horizontal motion was cancelled by the level edge or a too high step.
	pub blocked: bool,
	/// The character changed tile.
	pub reparented: bool,
	pub landed: bool,
	pub respawned: bool,
}

struct TileInfo {
	id: NodeId,
	elevation: f32,
	active: bool,
}

fn tile_info(graph: &SceneGraph, id: Option<NodeId>) -> Option<TileInfo> {
	let id = id?;
	let node = graph.get(id)?;
	node.data.as_tile()?;
	Some(TileInfo {
		id,
		elevation: node.elevation(),
		active: node.active,
	})
}

impl LevelPhysics {
	/// Advance the character `id` by `dt` seconds. `None` if `id` is not a character.
	pub fn step(&self, graph: &mut SceneGraph, tiles: &TileField, id: NodeId, dt: f32) -> Option<StepReport> {
		let mut movable = std::mem::take(&mut graph.get_mut(id)?.data.as_character_mut()?.movable);
		let report = self.step_movable(graph, tiles, id, &mut movable, dt);

		if let Some(character) = graph.get_mut(id).and_then(|node| node.data.as_character_mut()) {
			character.movable = movable;
		}
		Some(report)
	}

	fn step_movable(
		&self,
		graph: &mut SceneGraph,
		tiles: &TileField,
		id: NodeId,
		movable: &mut Movable,
		dt: f32,
	) -> StepReport {
		let mut report = StepReport::default();
		let scale = dt * self.unit_scale;
		let Some(mut position) = graph.get(id).map(|node| node.position()) else {
			return report;
		};
		let parent = tile_info(graph, graph.parent(id));

		// the floor may have been switched off under us
		if movable.grounded && !parent.as_ref().is_some_and(|tile| tile.active) {
			movable.grounded = false;
		}

		self.steer(graph, movable, position, scale);

		if !movable.grounded {
			movable.velocity.y += self.gravity * scale;
		}

		let next = tile_info(graph, tiles.tile_at_isometric(position + movable.velocity * scale));
		if next.as_ref().map(|tile| tile.id) != parent.as_ref().map(|tile| tile.id) {
			let blocked = match &next {
				None => true,
				Some(tile) if !tile.active => false,
				Some(tile) => position.y - tile.elevation > self.step_height,
			};
			if blocked {
				trace!("Character {:?} blocked", id);
				movable.velocity.x = 0.;
				movable.velocity.z = 0.;
				report.blocked = true;

				// the route no longer holds, give it up
				if movable.next_waypoint().is_some() {
					debug!("Character {:?} abandoned its path", id);
					movable.stop();
				}
			}
		}

		let displacement = movable.velocity * scale;
		graph.translate(id, displacement);
		position += displacement;

		let mut parent = parent;
		if let Some(tile) = tile_info(graph, tiles.tile_at_isometric(position)) {
			if parent.as_ref().map(|p| p.id) != Some(tile.id) && graph.reparent(id, tile.id) {
				debug!("Character {:?} moved onto tile {:?}", id, tile.id);
				report.reparented = true;

				if movable.grounded {
					if !tile.active || tile.elevation > position.y {
						movable.grounded = false;
					} else if tile.elevation < position.y {
						graph.translate(id, vec3(0., tile.elevation - position.y, 0.));
						position.y = tile.elevation;
					}
				}
				parent = Some(tile);
			}
		}

		if !movable.grounded {
			if let Some(tile) = parent.as_ref().filter(|tile| tile.active && position.y >= tile.elevation) {
				graph.translate(id, vec3(0., tile.elevation - position.y, 0.));
				movable.velocity.y = 0.;
				movable.grounded = true;
				report.landed = true;
			} else if position.y > self.max_depth {
				report.respawned = self.respawn(graph, tiles, id, movable);
			}
		}

		movable.advance_animation(dt);
		report
	}

	/// Horizontal velocity from the path or the heading.
	fn steer(&self, graph: &SceneGraph, movable: &mut Movable, position: Vec3, scale: f32) {
		let mut horizontal = vec2(0., 0.);

		if let Some(target) = movable.next_waypoint() {
			match graph.get(target).map(|node| node.position()) {
				Some(target_pos) => {
					let remaining = vec2(target_pos.x - position.x, target_pos.z - position.z);
					let reach = movable.speed * scale;
					movable.set_heading(vec3(remaining.x, 0., remaining.y));

					if remaining.length_squared() <= reach * reach {
						// land exactly on the waypoint centre
						if scale > 0. {
							horizontal = remaining / scale;
						}
						movable.pop_waypoint();
						if movable.next_waypoint().is_none() {
							movable.follow_path([]);
						}
					} else {
						horizontal = remaining.normalize_or_zero() * movable.speed;
					}
				}
				None => {
					movable.pop_waypoint();
				}
			}
		} else if movable.is_moving() {
			let heading = movable.heading();
			horizontal = vec2(heading.x, heading.z) * movable.speed;
		}

		movable.velocity.x = horizontal.x;
		movable.velocity.z = horizontal.y;
	}

	fn respawn(&self, graph: &mut SceneGraph, tiles: &TileField, id: NodeId, movable: &mut Movable) -> bool {
		let spawn = self
			.respawn
			.and_then(|(row, col)| tiles.tile_at_index(row, col))
			.or_else(|| tiles.origin_tile());
		let Some(spawn) = spawn else {
			return false;
		};
		let Some(spawn_pos) = graph.get(spawn).map(|node| node.position()) else {
			return false;
		};

		warn!("Character {:?} fell out of the level, respawning", id);
		graph.set_position(id, spawn_pos);
		graph.reparent(id, spawn);
		movable.stop();
		movable.velocity = Vec3::ZERO;
		movable.grounded = false;
		true
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use super::*;
	use crate::movable::{AnimationState, MoveState};
	use crate::node::{Character, NodeData, SceneNode};

	const DT: f32 = 1. / 60.;

	struct Fixture {
		graph: SceneGraph,
		tiles: TileField,
		physics: LevelPhysics,
	}

	impl Fixture {
		fn new(rows: usize, cols: usize, elevation: f32) -> Self {
			let mut graph = SceneGraph::new_with_root(SceneNode::new("level", Vec3::ZERO, NodeData::Generic));
			let root = graph.root();
			let tiles = TileField::generate(&mut graph, root, rows, cols, 84.).unwrap();
			for (_, _, id) in tiles.iter() {
				graph.translate(id, vec3(0., elevation, 0.));
			}
			Self {
				graph,
				tiles,
				physics: LevelPhysics::default(),
			}
		}

		fn tile(&self, row: usize, col: usize) -> NodeId {
			self.tiles.tile_at_index(row, col).unwrap()
		}

		fn spawn(&mut self, row: usize, col: usize, offset: Vec3, movable: Movable) -> NodeId {
			let tile = self.tile(row, col);
			let position = self.graph.get(tile).unwrap().position() + offset;
			let data = NodeData::Character(Character {
				movable,
				..Default::default()
			});
			self.graph.add_child(tile, SceneNode::new("hero", position, data)).unwrap()
		}

		fn movable(&self, id: NodeId) -> &Movable {
			&self.graph.get(id).unwrap().data.as_character().unwrap().movable
		}

		fn step(&mut self, id: NodeId) -> StepReport {
			self.physics.step(&mut self.graph, &self.tiles, id, DT).unwrap()
		}
	}

	#[test]
	fn lands_on_tile_at_same_elevation() {
		let mut f = Fixture::new(3, 3, 100.);
		let hero = f.spawn(1, 1, Vec3::ZERO, Movable::default());

		let report = f.step(hero);
		assert!(report.landed);
		let movable = f.movable(hero);
		assert!(movable.grounded);
		assert_eq!(movable.velocity.y, 0.);
		assert_eq!(f.graph.get(hero).unwrap().elevation(), 100.);
	}

	#[test]
	fn level_edge_blocks_horizontal_only() {
		let mut f = Fixture::new(3, 3, 100.);
		let mut movable = Movable::default();
		movable.set_direction(Vec3::NEG_X);
		let hero = f.spawn(1, 0, vec3(-41.5, -100., 0.), movable);
		let before = f.graph.get(hero).unwrap().position();

		let report = f.step(hero);
		assert!(report.blocked);
		let movable = f.movable(hero);
		assert_eq!(movable.velocity.x, 0.);
		assert_eq!(movable.velocity.z, 0.);
		assert!(movable.velocity.y > 0.);
		let after = f.graph.get(hero).unwrap().position();
		assert_eq!(after.x, before.x);
		assert!(after.y > before.y);
	}

	#[test]
	fn too_high_step_blocks() {
		let mut f = Fixture::new(1, 2, 100.);
		let wall = f.tile(0, 1);
		f.graph.translate(wall, vec3(0., -50., 0.));
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., 0., 0.), movable);

		let report = f.step(hero);
		assert!(report.blocked);
		assert_eq!(f.graph.parent(hero), Some(f.tile(0, 0)));
	}

	#[test]
	fn low_step_is_climbed() {
		let mut f = Fixture::new(1, 2, 100.);
		let stair = f.tile(0, 1);
		f.graph.translate(stair, vec3(0., -10., 0.));
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., 0., 0.), movable);

		let report = f.step(hero);
		assert!(!report.blocked);
		assert!(report.reparented);
		assert_eq!(f.graph.parent(hero), Some(stair));
		assert_eq!(f.graph.get(hero).unwrap().elevation(), 90.);
		assert!(f.movable(hero).grounded);
	}

	#[test]
	fn walking_off_a_ledge_falls_then_lands() {
		let mut f = Fixture::new(1, 2, 100.);
		let pit = f.tile(0, 1);
		f.graph.translate(pit, vec3(0., 60., 0.));
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., 0., 0.), movable);

		f.step(hero);
		assert_eq!(f.graph.parent(hero), Some(pit));
		assert!(!f.movable(hero).grounded);

		let mut landed = false;
		for _ in 0..120 {
			if f.step(hero).landed {
				landed = true;
				break;
			}
		}
		assert!(landed);
		assert_eq!(f.graph.get(hero).unwrap().elevation(), 160.);
	}

	#[test]
	fn inactive_tile_is_fallen_through_and_respawns() {
		let mut f = Fixture::new(1, 2, 100.);
		f.physics.max_depth = 300.;
		f.physics.respawn = Some((0, 0));
		let hole = f.tile(0, 1);
		f.graph.get_mut(hole).unwrap().active = false;
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., 0., 0.), movable);

		let report = f.step(hero);
		assert!(!report.blocked);
		assert_eq!(f.graph.parent(hero), Some(hole));
		assert!(!f.movable(hero).grounded);

		let mut respawned = false;
		for _ in 0..600 {
			if f.step(hero).respawned {
				respawned = true;
				break;
			}
		}
		assert!(respawned);
		assert_eq!(f.graph.parent(hero), Some(f.tile(0, 0)));
		assert_eq!(f.movable(hero).move_state(), MoveState::Idle);
		assert!(f.step(hero).landed);
	}

	#[test]
	fn path_is_followed_onto_centres() {
		let mut f = Fixture::new(1, 3, 0.);
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.follow_path([f.tile(0, 1), f.tile(0, 2)]);
		let hero = f.spawn(0, 0, Vec3::ZERO, movable);

		for _ in 0..600 {
			f.step(hero);
			if !f.movable(hero).is_moving() {
				break;
			}
		}
		let goal = f.tile(0, 2);
		assert_eq!(f.graph.parent(hero), Some(goal));
		let pos = f.graph.get(hero).unwrap().position();
		assert!((pos - f.graph.get(goal).unwrap().position()).length() < 1e-3);
		assert_eq!(f.movable(hero).animation_state(), AnimationState::Idle);
	}

	#[test]
	fn blocked_path_is_abandoned() {
		let mut f = Fixture::new(1, 3, 0.);
		let wall = f.tile(0, 1);
		f.graph.translate(wall, vec3(0., -100., 0.));
		let mut movable = Movable {
			grounded: true,
			..Default::default()
		};
		movable.follow_path([wall, f.tile(0, 2)]);
		let hero = f.spawn(0, 0, Vec3::ZERO, movable);

		let mut blocked = false;
		for _ in 0..120 {
			if f.step(hero).blocked {
				blocked = true;
				break;
			}
		}
		assert!(blocked);
		let movable = f.movable(hero);
		assert_eq!(movable.move_state(), MoveState::Idle);
		assert!(movable.next_waypoint().is_none());
		assert_eq!(f.graph.parent(hero), Some(f.tile(0, 0)));

		f.step(hero);
		assert_eq!(f.movable(hero).animation_state(), AnimationState::Idle);
	}

	#[test]
	fn falling_into_a_high_wall_is_blocked() {
		let mut f = Fixture::new(1, 2, 100.);
		let wall = f.tile(0, 1);
		f.graph.translate(wall, vec3(0., -50., 0.));
		let mut movable = Movable::default();
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., -20., 0.), movable);

		let report = f.step(hero);
		assert!(report.blocked);
		assert!(!f.movable(hero).grounded);
		assert_eq!(f.graph.parent(hero), Some(f.tile(0, 0)));

		let mut landed = false;
		for _ in 0..120 {
			let report = f.step(hero);
			assert_eq!(f.graph.parent(hero), Some(f.tile(0, 0)));
			if report.landed {
				landed = true;
				break;
			}
			assert!(report.blocked);
		}
		assert!(landed);
		assert_eq!(f.graph.get(hero).unwrap().elevation(), 100.);
	}

	#[test]
	fn falling_onto_a_low_step_lands_there() {
		let mut f = Fixture::new(1, 2, 100.);
		let stair = f.tile(0, 1);
		f.graph.translate(stair, vec3(0., -10., 0.));
		let mut movable = Movable::default();
		movable.set_direction(Vec3::X);
		let hero = f.spawn(0, 0, vec3(41., -20., 0.), movable);

		let report = f.step(hero);
		assert!(!report.blocked);
		assert!(report.reparented);
		assert!(!report.landed);
		assert_eq!(f.graph.parent(hero), Some(stair));

		let mut landed = false;
		for _ in 0..120 {
			if f.step(hero).landed {
				landed = true;
				break;
			}
		}
		assert!(landed);
		assert_eq!(f.graph.parent(hero), Some(stair));
		assert_eq!(f.graph.get(hero).unwrap().elevation(), 90.);
		assert!(f.movable(hero).grounded);
	}
}
