pub mod json;
mod level;

pub use level::{load_level, parse_level_record, save_level, serialize_level_record, LevelParseError, LevelParseResult};
