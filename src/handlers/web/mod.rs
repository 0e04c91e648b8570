pub mod map_page;
pub mod unmapped_page;

pub use map_page::*;
pub use unmapped_page::*;
