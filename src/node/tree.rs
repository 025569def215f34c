use std::collections::HashMap;
use std::fmt::Display;

use glam::Vec3;
use indextree::{Arena, NodeId};
use tracing::trace;

use super::SceneNode;
use crate::event::{EventQueue, Signal};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
	#[error("Node name {0:?} is already taken")]
	DuplicateName(String),
	#[error("Unknown parent node")]
	UnknownParent,
	#[error("No tile at row {0}, column {1}")]
	NoSuchTile(usize, usize),
	#[error("Tile grid needs at least one row and column, got {rows}x{cols}")]
	EmptyGrid { rows: usize, cols: usize },
	#[error("Tile size must be positive, got {0}")]
	InvalidTileSize(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
	ChildAttached { parent: NodeId, child: NodeId },
	ChildDetached { parent: NodeId, child: NodeId },
}

/// Arena-backed tree of [`SceneNode`]s, indexed by unique name.
///
/// Attach and detach notify [`SceneGraph::node_events`] listeners synchronously and
/// also queue the event until [`SceneGraph::drain_events`] takes it, which the level
/// does once per frame after the physics pass.
#[derive(Debug)]
pub struct SceneGraph {
	root: NodeId,
	arena: Arena<SceneNode>,
	names: HashMap<String, NodeId>,
	node_events: Signal<NodeEvent>,
	pending: EventQueue<NodeEvent>,
}

impl SceneGraph {
	pub fn new_with_root(node: SceneNode) -> Self {
		let mut arena = Arena::new();
		let mut names = HashMap::new();

		let name = node.name().to_owned();
		let root = arena.new_node(node);
		names.insert(name, root);

		Self {
			root,
			arena,
			names,
			node_events: Signal::new(),
			pending: EventQueue::new(),
		}
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	/// Number of live nodes, root included.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Create a node with no parent.
	pub fn add(&mut self, node: SceneNode) -> Result<NodeId, SceneError> {
		if self.names.contains_key(node.name()) {
			return Err(SceneError::DuplicateName(node.name().to_owned()));
		}

		let name = node.name().to_owned();
		let id = self.arena.new_node(node);
		self.names.insert(name, id);
		Ok(id)
	}

	/// Create a node and attach it under `parent`.
	pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
		if !self.contains(parent) {
			return Err(SceneError::UnknownParent);
		}

		let id = self.add(node)?;
		self.attach_child(parent, id);
		Ok(id)
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.arena.get(id).is_some_and(|node| !node.is_removed())
	}

	pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
		let node = self.arena.get(id)?;
		(!node.is_removed()).then(|| node.get())
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
		let node = self.arena.get_mut(id)?;
		if node.is_removed() {
			return None;
		}
		Some(node.get_mut())
	}

	pub fn find(&self, name: &str) -> Option<NodeId> {
		self.names.get(name).copied()
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		let node = self.arena.get(id)?;
		if node.is_removed() {
			return None;
		}
		node.parent()
	}

	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		if !self.contains(id) {
			return Vec::new();
		}
		id.children(&self.arena).collect()
	}

	pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
		let child = self.find(name)?;
		(self.parent(child)? == parent).then_some(child)
	}

	/// Every transitive child of `id`, pre-order, without `id` itself.
	pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
		if !self.contains(id) {
			return Vec::new();
		}
		id.descendants(&self.arena).skip(1).collect()
	}

	/// All live nodes in creation order.
	pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
		self.arena
			.iter()
			.filter(|node| !node.is_removed())
			.filter_map(|node| Some((self.arena.get_node_id(node)?, node.get())))
	}

	/// Listeners for attach/detach notifications.
	pub fn node_events(&mut self) -> &mut Signal<NodeEvent> {
		&mut self.node_events
	}

	/// Take every attach and detach queued since the last drain, oldest first.
	pub fn drain_events(&mut self) -> Vec<NodeEvent> {
		self.pending.drain().collect()
	}

	fn notify(&mut self, event: NodeEvent) {
		self.node_events.emit(&event);
		self.pending.send(event);
	}

	/// Make `child` a child of `parent`.
	///
	/// No-op returning `false` if either node is unknown, `child` already has a parent,
	/// or `child` is `parent` itself or one of its ancestors.
	pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> bool {
		if !self.contains(parent) || !self.contains(child) || self.parent(child).is_some() {
			return false;
		}
		if parent.ancestors(&self.arena).any(|ancestor| ancestor == child) {
			return false;
		}
		if parent.checked_append(child, &mut self.arena).is_err() {
			return false;
		}

		trace!("Attached {:?} under {:?}", child, parent);
		self.notify(NodeEvent::ChildAttached { parent, child });
		true
	}

	/// Detach the child called `name` from `parent`. The node stays alive, parentless.
	pub fn detach_child(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
		let child = self.child_by_name(parent, name)?;
		child.detach(&mut self.arena);

		trace!("Detached {:?} from {:?}", child, parent);
		self.notify(NodeEvent::ChildDetached { parent, child });
		Some(child)
	}

	/// Detach `child` from whatever holds it, then attach it under `new_parent`.
	pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> bool {
		if !self.contains(new_parent) || self.parent(child) == Some(new_parent) {
			return false;
		}
		if new_parent.ancestors(&self.arena).any(|ancestor| ancestor == child) {
			return false;
		}

		if let Some(old_parent) = self.parent(child) {
			let name = self.arena[child].get().name().to_owned();
			self.detach_child(old_parent, &name);
		}
		self.attach_child(new_parent, child)
	}

	/// Destroy `id` and its whole subtree. The root can not be removed.
	pub fn remove(&mut self, id: NodeId) -> bool {
		if id == self.root || !self.contains(id) {
			return false;
		}

		if let Some(parent) = self.parent(id) {
			let name = self.arena[id].get().name().to_owned();
			self.detach_child(parent, &name);
		}

		for node in id.descendants(&self.arena).collect::<Vec<_>>() {
			let name = self.arena[node].get().name().to_owned();
			self.names.remove(&name);
		}
		id.remove_subtree(&mut self.arena);
		true
	}

	/// Move `id` and every descendant by `delta`.
	pub fn translate(&mut self, id: NodeId, delta: Vec3) -> bool {
		if !self.contains(id) {
			return false;
		}

		for node in id.descendants(&self.arena).collect::<Vec<_>>() {
			self.arena[node].get_mut().position += delta;
		}
		true
	}

	/// Move `id` to `position`, carrying its descendants along.
	pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
		match self.get(id) {
			Some(node) => {
				let delta = position - node.position;
				self.translate(id, delta)
			}
			None => false,
		}
	}
}

fn rec_fmt(indent: usize, f: &mut std::fmt::Formatter<'_>, node_id: NodeId, arena: &Arena<SceneNode>) -> std::fmt::Result {
	let Some(node) = arena.get(node_id) else {
		return Ok(());
	};

	let node = node.get();

	let kind = node.data.kind_name();
	#[cfg(feature = "owo")]
	let kind = {
		use owo_colors::OwoColorize;
		kind.magenta()
	};

	let p = node.position;
	writeln!(
		f,
		"{}- [{}] {} ({:.1}, {:.1}, {:.1}){}",
		"  ".repeat(indent),
		kind,
		node.name(),
		p.x,
		p.y,
		p.z,
		if node.active { "" } else { " inactive" }
	)?;
	for child in node_id.children(arena) {
		rec_fmt(indent + 1, f, child, arena)?;
	}

	Ok(())
}

impl Display for SceneGraph {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if !self.contains(self.root) {
			return write!(f, "(empty)");
		}
		rec_fmt(0, f, self.root, &self.arena)
	}
}
