pub mod boundaries;
pub mod error;
pub mod feed;
pub mod geojson;

pub use boundaries::*;
pub use error::*;
pub use feed::*;
pub use geojson::*;
