mod files;
pub mod models;
pub mod repository;
mod subjects;
mod tables;

pub use repository::{Repository, StorageError};
pub use tables::*;
