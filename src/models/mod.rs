pub mod alumnus;
pub mod location;

pub use alumnus::*;
pub use location::*;
