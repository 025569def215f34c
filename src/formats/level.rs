use json::JsonValue;
use tracing::info;

use crate::level::record::{LevelRecord, ObjectKind, ObjectRecord, TileRecord};
use crate::level::LevelManager;
use crate::math::matrix::Matrix2dFromVecError;
use crate::node::SceneError;

use super::json::{nullable_str_to_json, vec3_to_json, JsonError, JsonObject};

pub type LevelParseResult<T> = Result<T, LevelParseError>;

#[derive(Debug, thiserror::Error)]
pub enum LevelParseError {
	#[error(transparent)]
	JsonParseError(#[from] json::Error),
	#[error(transparent)]
	JsonError(#[from] JsonError),
	#[error(transparent)]
	Scene(#[from] SceneError),
	#[error(transparent)]
	InvalidTileGrid(#[from] Matrix2dFromVecError),
	#[error("Level has no tiles ({rows}x{cols})")]
	EmptyGrid { rows: usize, cols: usize },
	#[error("Expected {expected} tiles, got {got}")]
	TileCountMismatch { expected: usize, got: usize },
	#[error("Tile size must be positive, got {0}")]
	InvalidTileSize(f32),
	#[error("Unknown object kind {0:?}")]
	UnknownObjectKind(String),
}

impl LevelParseError {
	pub fn nested(self, key: &str) -> Self {
		match self {
			LevelParseError::JsonError(err) => LevelParseError::JsonError(err.nested(key)),
			_ => self,
		}
	}

	fn in_list(self, index: usize) -> Self {
		match self {
			LevelParseError::JsonError(err) => LevelParseError::JsonError(err.in_list(index)),
			_ => self,
		}
	}
}

fn vals<T>(key: &str, res: LevelParseResult<T>) -> LevelParseResult<T> {
	res.map_err(|e| e.nested(key))
}

/// Parse and build a level from its JSON text.
pub fn load_level(text: &str) -> LevelParseResult<LevelManager> {
	let record = parse_level_record(text)?;
	let level = LevelManager::from_record(&record)?;
	info!("Loaded {}x{} level", record.rows, record.cols);
	Ok(level)
}

/// Pretty-printed JSON of the level's current state.
pub fn save_level(level: &LevelManager) -> String {
	let record = level.to_record();
	info!("Saved {}x{} level", record.rows, record.cols);
	json::stringify_pretty(serialize_level_record(&record), 2)
}

// parsing

pub fn parse_level_record(text: &str) -> LevelParseResult<LevelRecord> {
	let value = json::parse(text)?;
	let obj = JsonObject::from_value(&value, "level")?;

	let tiles = obj
		.get_list("tiles")?
		.iter()
		.enumerate()
		.map(|(i, tile)| deserialize_tile(tile).map_err(|e| e.in_list(i)))
		.collect::<LevelParseResult<Vec<_>>>();

	Ok(LevelRecord {
		rows: obj.get_usize("rows")?,
		cols: obj.get_usize("cols")?,
		tile_size: obj.get_f32("tile_size")?,
		tiles: vals("tiles", tiles)?,
	})
}

fn deserialize_tile(value: &JsonValue) -> LevelParseResult<TileRecord> {
	let obj = JsonObject::from_value(value, "tile")?;
	Ok(TileRecord {
		name: obj.get_str("name")?.to_owned(),
		position: obj.get_vec3("position")?,
		drawable: obj.get_nullable_str("drawable")?.map(str::to_owned),
		active: obj.get_bool_or("active", true)?,
		children: vals("children", deserialize_objects(obj.get_list_or_empty("children")?))?,
	})
}

fn deserialize_objects(values: &[JsonValue]) -> LevelParseResult<Vec<ObjectRecord>> {
	values
		.iter()
		.enumerate()
		.map(|(i, value)| deserialize_object(value).map_err(|e| e.in_list(i)))
		.collect()
}

fn deserialize_object(value: &JsonValue) -> LevelParseResult<ObjectRecord> {
	let obj = JsonObject::from_value(value, "object")?;
	let kind = match obj.get_str("kind")? {
		"Node" => ObjectKind::Node,
		"Character" => ObjectKind::Character {
			inventory: obj.get_counts("inventory")?,
		},
		"Consumable" => ObjectKind::Consumable {
			item: obj.get_str("item")?.to_owned(),
			amount: obj.get_u32("amount")?,
		},
		kind => return Err(LevelParseError::UnknownObjectKind(kind.to_owned())),
	};

	Ok(ObjectRecord {
		name: obj.get_str("name")?.to_owned(),
		kind,
		position: obj.get_vec3("position")?,
		drawable: obj.get_nullable_str("drawable")?.map(str::to_owned),
		active: obj.get_bool_or("active", true)?,
		children: vals("children", deserialize_objects(obj.get_list_or_empty("children")?))?,
	})
}

// serializing

pub fn serialize_level_record(record: &LevelRecord) -> JsonValue {
	json::object! {
		rows: record.rows,
		cols: record.cols,
		tile_size: record.tile_size,
		tiles: record.tiles.iter().map(serialize_tile).collect::<Vec<_>>(),
	}
}

fn serialize_tile(tile: &TileRecord) -> JsonValue {
	json::object! {
		name: tile.name.as_str(),
		position: vec3_to_json(tile.position),
		drawable: nullable_str_to_json(tile.drawable.as_deref()),
		active: tile.active,
		children: tile.children.iter().map(serialize_object).collect::<Vec<_>>(),
	}
}

fn serialize_object(object: &ObjectRecord) -> JsonValue {
	let mut value = json::object! {
		name: object.name.as_str(),
		kind: object.kind.name(),
		position: vec3_to_json(object.position),
		drawable: nullable_str_to_json(object.drawable.as_deref()),
		active: object.active,
		children: object.children.iter().map(serialize_object).collect::<Vec<_>>(),
	};

	match &object.kind {
		ObjectKind::Node => {}
		ObjectKind::Character { inventory } => {
			let mut counts = JsonValue::new_object();
			for (item, count) in inventory {
				counts[item.as_str()] = (*count).into();
			}
			value["inventory"] = counts;
		}
		ObjectKind::Consumable { item, amount } => {
			value["item"] = item.as_str().into();
			value["amount"] = (*amount).into();
		}
	}
	value
}
