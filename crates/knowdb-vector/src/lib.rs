//! In-memory vector index with exact top-k search.

pub mod flat;
pub mod similarity;

pub use flat::FlatIndex;
