pub mod batch;
pub mod pathfind;
pub mod steering;
