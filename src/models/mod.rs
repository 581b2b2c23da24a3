pub mod loaders;
pub mod post;

pub use loaders::load_catalog;
pub use post::{CatalogEntry, ContentCatalog, PostCandidate};
