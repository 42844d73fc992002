use std::path::PathBuf;

use thiserror::Error;

pub mod catalog;
pub mod library;
pub mod parser;

pub use catalog::{CatalogEntry, CombinationCatalog};
pub use library::{ImageAsset, ScriptLibrary, ScriptLookup};
pub use parser::{GameClass, KnownMap};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),
    #[error("{} is {size_bytes} bytes, over the {limit} byte limit", path.display())]
    TooLarge {
        path: PathBuf,
        size_bytes: u64,
        limit: u64,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
