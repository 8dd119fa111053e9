pub mod cursor;
pub mod settler;
pub mod sprite;
pub mod tilemap;
