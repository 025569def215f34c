pub mod angle;
pub mod matrix;
