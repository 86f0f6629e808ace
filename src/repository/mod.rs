use std::{io, path::PathBuf};

use thiserror::Error;

use crate::bank::{Bank, StateError};

pub mod in_memory;
pub mod json_file;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to access `{}`: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Malformed bank state in `{}`: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Inconsistent bank state in `{}`: {source}", .path.display())]
    Inconsistent { path: PathBuf, source: StateError },
}

/// Storage for the bank state between runs.
pub trait Repository {
    /// Returns `None` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<Bank>, RepositoryError>;

    fn save(&mut self, bank: &Bank) -> Result<(), RepositoryError>;
}

impl<R> Repository for &mut R
where
    R: Repository,
{
    fn load(&mut self) -> Result<Option<Bank>, RepositoryError> {
        (**self).load()
    }

    fn save(&mut self, bank: &Bank) -> Result<(), RepositoryError> {
        (**self).save(bank)
    }
}
