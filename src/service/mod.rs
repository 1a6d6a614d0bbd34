pub mod enricher;
pub mod geocoder;
pub mod http;
pub mod mapper;
pub mod search;

pub use enricher::Enricher;
pub use geocoder::Geocoder;
pub use mapper::MapBuilder;
pub use search::{CompanyLookup, SearchClient};
