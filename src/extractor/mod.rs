// Extractor module: maps each retail site's raw JSON into RawListing.

pub mod loader;
pub mod sources;

pub use loader::load_dataset;
