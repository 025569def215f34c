use std::collections::{HashMap, VecDeque};

use indextree::NodeId;

use crate::node::SceneGraph;

/// Breadth-first search over tile neighbor links, through active tiles only.
///
/// A link is only crossed when the next tile rises at most `step_height` above the
/// current one. Dropping down is always allowed. The path excludes `from` and ends
/// with `to`. Empty when `to` can not be reached, is inactive, or is `from` itself.
pub fn find_path(graph: &SceneGraph, from: NodeId, to: NodeId, step_height: f32) -> Vec<NodeId> {
	if from == to || elevation(graph, to).is_none() || graph.get(from).and_then(|n| n.data.as_tile()).is_none() {
		return Vec::new();
	}

	let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
	let mut frontier = VecDeque::from([from]);

	while let Some(current) = frontier.pop_front() {
		if current == to {
			break;
		}

		let Some(node) = graph.get(current) else {
			continue;
		};
		let Some(tile) = node.data.as_tile() else {
			continue;
		};
		let height = node.elevation();
		for (_, next) in tile.neighbors() {
			if next == from || came_from.contains_key(&next) {
				continue;
			}
			// elevation grows downward
			if !elevation(graph, next).is_some_and(|y| height - y <= step_height) {
				continue;
			}
			came_from.insert(next, current);
			frontier.push_back(next);
		}
	}

	let mut path = Vec::new();
	let mut current = to;
	while current != from {
		path.push(current);
		match came_from.get(&current) {
			Some(prev) => current = *prev,
			None => return Vec::new(),
		}
	}
	path.reverse();
	path
}

/// Elevation of an active tile, `None` for anything that can not be walked on.
fn elevation(graph: &SceneGraph, id: NodeId) -> Option<f32> {
	graph
		.get(id)
		.filter(|node| node.active && node.data.is_tile())
		.map(|node| node.elevation())
}

#[cfg(test)]
mod tests {
	use glam::{vec3, Vec3};

	use super::*;
	use crate::node::{NodeData, SceneNode};
	use crate::tiles::TileField;

	const STEP: f32 = 24.;

	fn level(rows: usize, cols: usize) -> (SceneGraph, TileField) {
		let mut graph = SceneGraph::new_with_root(SceneNode::new("level", Vec3::ZERO, NodeData::Generic));
		let root = graph.root();
		let tiles = TileField::generate(&mut graph, root, rows, cols, 10.).unwrap();
		(graph, tiles)
	}

	#[test]
	fn straight_line() {
		let (graph, tiles) = level(1, 4);
		let t = |c| tiles.tile_at_index(0, c).unwrap();
		assert_eq!(find_path(&graph, t(0), t(3), STEP), vec![t(1), t(2), t(3)]);
	}

	#[test]
	fn routes_around_inactive_tiles() {
		let (mut graph, tiles) = level(3, 3);
		let t = |r, c| tiles.tile_at_index(r, c).unwrap();
		graph.get_mut(t(1, 1)).unwrap().active = false;
		graph.get_mut(t(0, 1)).unwrap().active = false;

		let path = find_path(&graph, t(0, 0), t(0, 2), STEP);
		assert_eq!(path.len(), 6);
		assert_eq!(path.last(), Some(&t(0, 2)));
		assert!(!path.contains(&t(1, 1)));
	}

	#[test]
	fn unreachable_or_trivial_is_empty() {
		let (mut graph, tiles) = level(1, 3);
		let t = |c| tiles.tile_at_index(0, c).unwrap();
		assert!(find_path(&graph, t(0), t(0), STEP).is_empty());

		graph.get_mut(t(1)).unwrap().active = false;
		assert!(find_path(&graph, t(0), t(2), STEP).is_empty());
		assert!(find_path(&graph, t(0), t(1), STEP).is_empty());
	}

	#[test]
	fn climbs_low_steps_and_routes_around_walls() {
		let (mut graph, tiles) = level(3, 3);
		let t = |r, c| tiles.tile_at_index(r, c).unwrap();
		graph.translate(t(0, 1), vec3(0., -100., 0.));
		graph.translate(t(1, 1), vec3(0., -20., 0.));

		let path = find_path(&graph, t(0, 0), t(0, 2), STEP);
		assert_eq!(path, vec![t(1, 0), t(1, 1), t(1, 2), t(0, 2)]);

		// the wall itself can be dropped off but not climbed onto
		assert!(find_path(&graph, t(0, 0), t(0, 1), STEP).is_empty());
		graph.translate(t(0, 0), vec3(0., -100., 0.));
		assert_eq!(find_path(&graph, t(0, 1), t(0, 2), STEP), vec![t(0, 2)]);
	}
}
