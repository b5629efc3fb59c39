//! Resource aggregate

pub mod model;
pub mod repository;

pub use model::Resource;
pub use repository::ResourceRepository;
