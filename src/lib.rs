pub mod camera;
pub mod controller;
pub mod event;
pub mod formats;
pub mod input;
pub mod level;
pub mod math;
pub mod movable;
pub mod node;
pub mod pathfinding;
pub mod physics;
pub mod tiles;
