// Utility functions

pub mod json;
pub mod logger;

pub use json::extract_json_block;
pub use logger::init_logger;
