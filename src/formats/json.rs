//! Typed accessors over `json` objects, reporting which key went wrong.

use std::collections::BTreeMap;

use glam::Vec3;
use json::JsonValue;

pub(crate) trait SerialExtend {
	fn as_object(&self) -> Option<&json::object::Object>;
}

impl SerialExtend for JsonValue {
	fn as_object(&self) -> Option<&json::object::Object> {
		if let JsonValue::Object(object) = self {
			Some(object)
		} else {
			None
		}
	}
}

pub type JsonResult<T> = Result<T, JsonError>;

/// Why a piece of level data could not be read. Nested variants trace the path from
/// the document root down to the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum JsonError {
	#[error("missing field {0:?}")]
	MissingField(String),
	#[error("field {field:?} should be {expected}")]
	WrongType { field: String, expected: &'static str },
	#[error("field {0:?} should be a whole count that fits in 32 bits")]
	CountOutOfRange(String),
	#[error("field {field:?} is not an [x, y, z] position: {reason}")]
	InvalidPosition { field: String, reason: String },
	#[error("entry {index}: {inner}")]
	InEntry { index: usize, inner: Box<JsonError> },
	#[error("in {field:?}: {inner}")]
	InField { field: String, inner: Box<JsonError> },
}

impl JsonError {
	fn wrong_type(field: &str, expected: &'static str) -> Self {
		Self::WrongType {
			field: field.to_owned(),
			expected,
		}
	}

	pub fn nested(self, field: &str) -> Self {
		Self::InField {
			field: field.to_owned(),
			inner: Box::new(self),
		}
	}

	pub fn in_list(self, index: usize) -> Self {
		Self::InEntry {
			index,
			inner: Box::new(self),
		}
	}
}

pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	/// Wrap a value that must be an object. `what` names it in the error.
	pub fn from_value(value: &'a JsonValue, what: &str) -> JsonResult<Self> {
		match value.as_object() {
			Some(object) => Ok(JsonObject(object)),
			None => Err(JsonError::wrong_type(what, "an object")),
		}
	}

	fn get(&self, key: &str) -> JsonResult<&'a JsonValue> {
		match self.0.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::MissingField(key.to_owned())),
		}
	}

	pub fn contains(&self, key: &str) -> bool {
		self.0.get(key).is_some_and(|value| !value.is_null())
	}

	pub fn get_object(&self, key: &str) -> JsonResult<JsonObject<'a>> {
		JsonObject::from_value(self.get(key)?, key)
	}

	pub fn get_list(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get(key)? {
			JsonValue::Array(list) => Ok(list),
			_ => Err(JsonError::wrong_type(key, "a list")),
		}
	}

	/// Like [`JsonObject::get_list`], but a missing or null key is an empty list.
	pub fn get_list_or_empty(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		if !self.contains(key) {
			return Ok(&[]);
		}
		self.get_list(key)
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(value) => Ok(value),
			None => Err(JsonError::wrong_type(key, "a string")),
		}
	}

	/// A missing or null key is `None`.
	pub fn get_nullable_str(&self, key: &str) -> JsonResult<Option<&'a str>> {
		if !self.contains(key) {
			return Ok(None);
		}
		self.get_str(key).map(Some)
	}

	fn get_number(&self, key: &str) -> JsonResult<json::number::Number> {
		match self.get(key)?.as_number() {
			Some(value) => Ok(value),
			None => Err(JsonError::wrong_type(key, "a number")),
		}
	}

	pub fn get_f32(&self, key: &str) -> JsonResult<f32> {
		Ok(self.get_number(key)?.into())
	}

	pub fn get_u32(&self, key: &str) -> JsonResult<u32> {
		self.get_number(key)?
			.try_into()
			.map_err(|_| JsonError::CountOutOfRange(key.to_owned()))
	}

	pub fn get_usize(&self, key: &str) -> JsonResult<usize> {
		self.get_number(key)?
			.try_into()
			.map_err(|_| JsonError::CountOutOfRange(key.to_owned()))
	}

	pub fn get_bool(&self, key: &str) -> JsonResult<bool> {
		match self.get(key)?.as_bool() {
			Some(value) => Ok(value),
			None => Err(JsonError::wrong_type(key, "a bool")),
		}
	}

	/// A missing key takes `default`.
	pub fn get_bool_or(&self, key: &str, default: bool) -> JsonResult<bool> {
		if !self.contains(key) {
			return Ok(default);
		}
		self.get_bool(key)
	}

	pub fn get_vec3(&self, key: &str) -> JsonResult<Vec3> {
		let list = self.get_list(key)?;
		if list.len() != 3 {
			return Err(JsonError::InvalidPosition {
				field: key.to_owned(),
				reason: format!("{} components", list.len()),
			});
		}

		let mut xyz = [0.; 3];
		for (value, out) in list.iter().zip(xyz.iter_mut()) {
			*out = match value.as_number() {
				Some(number) => number.into(),
				None => {
					return Err(JsonError::InvalidPosition {
						field: key.to_owned(),
						reason: "components must be numbers".to_owned(),
					})
				}
			};
		}
		Ok(Vec3::from_array(xyz))
	}

	/// Object of unsigned counters, e.g. `{ "coin": 3 }`. Missing is empty.
	pub fn get_counts(&self, key: &str) -> JsonResult<BTreeMap<String, u32>> {
		if !self.contains(key) {
			return Ok(BTreeMap::new());
		}

		let object = self.get_object(key)?;
		let mut counts = BTreeMap::new();
		for (name, _) in object.0.iter() {
			let count = object.get_u32(name).map_err(|e| e.nested(key))?;
			counts.insert(name.to_owned(), count);
		}
		Ok(counts)
	}
}

pub(crate) fn vec3_to_json(value: Vec3) -> JsonValue {
	json::array![value.x, value.y, value.z]
}

pub(crate) fn nullable_str_to_json(value: Option<&str>) -> JsonValue {
	match value {
		Some(value) => value.into(),
		None => JsonValue::Null,
	}
}
