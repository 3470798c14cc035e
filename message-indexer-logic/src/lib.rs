pub mod codec;
pub mod gateway;
pub mod indexer;
pub mod inspection;
pub mod normalizer;
pub mod repository;
pub mod types;
