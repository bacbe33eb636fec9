pub mod engine;
pub mod error;
pub mod grid;
pub mod io;
pub mod layout;
pub mod loader;
pub mod model;
pub mod reshape;
pub mod table;
