pub mod sheet;

pub use sheet::{default_output_path, Sheet};
