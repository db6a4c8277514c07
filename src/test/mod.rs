mod menu;
mod schema;
pub mod utils;
