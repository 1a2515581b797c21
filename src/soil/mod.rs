//! Soil stratigraphy and geostatic stress

mod layer;
mod layer_table;

pub use layer::{SoilKind, SoilLayer};
pub use layer_table::{LayerTable, GAMMA_WATER};
