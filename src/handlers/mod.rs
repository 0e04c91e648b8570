pub mod admin;
pub mod locations;
pub mod map;
pub mod reports;
pub mod web;

pub use admin::*;
pub use locations::*;
pub use map::*;
pub use reports::*;
