use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
};

use crate::bank::Bank;

use super::{Repository, RepositoryError};

/// Stores the whole bank as one pretty-printed JSON document.
///
/// Saves go to a sibling temporary file first and are renamed over the
/// target, so an interrupted save leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_err(&self, source: io::Error) -> RepositoryError {
        RepositoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Repository for JsonFileRepository {
    fn load(&mut self) -> Result<Option<Bank>, RepositoryError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.path.display(), "no bank state found, starting empty");
                return Ok(None);
            }
            Err(err) => return Err(self.io_err(err)),
        };
        let bank: Bank = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            RepositoryError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        bank.check_consistency()
            .map_err(|source| RepositoryError::Inconsistent {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "bank state loaded");
        Ok(Some(bank))
    }

    fn save(&mut self, bank: &Bank) -> Result<(), RepositoryError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let file = File::create(&tmp).map_err(|err| self.io_err(err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, bank).map_err(|err| self.io_err(err.into()))?;
        writer.flush().map_err(|err| self.io_err(err))?;
        drop(writer);
        fs::rename(&tmp, &self.path).map_err(|err| self.io_err(err))?;

        tracing::debug!(path = %self.path.display(), "bank state saved");
        Ok(())
    }
}
