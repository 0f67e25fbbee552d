pub mod generator;

pub use generator::PagedExtractionGenerator;
