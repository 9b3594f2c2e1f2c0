//! File input and output: price loading, CSV export and SVG figures.

pub mod charts;
pub mod export;
pub mod prices;
