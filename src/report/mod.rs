pub mod heatmap;
pub mod plate_map;
pub mod render;
pub mod svg;
pub mod zip;
