pub mod composer;
pub mod host;
pub mod session;

pub use composer::*;
pub use host::*;
pub use session::*;
