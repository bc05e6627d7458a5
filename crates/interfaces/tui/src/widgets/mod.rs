pub mod item;
pub mod status;
pub mod suggestions;
