pub mod boundary;
pub mod cluster;
pub mod layer;
pub mod legend;
pub mod marker;
pub mod symbology;

pub use layer::*;
