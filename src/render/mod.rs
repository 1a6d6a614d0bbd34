pub mod map_page;

pub use map_page::MapPage;
