use std::{
    collections::HashMap,
    fmt,
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Postal code must have exactly 8 digits, got `{0}`")]
    InvalidPostalCode(String),
    #[error("No address found for postal code {0}")]
    NotFound(String),
    #[error("Address book `{}` is unreadable: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("Address book `{}` is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} - {}/{}",
            self.street, self.district, self.city, self.state
        )
    }
}

/// Resolves a postal code to an address. Callers fall back to manual entry
/// on any error.
pub trait AddressLookup {
    fn lookup(&self, postal_code: &str) -> Result<Address, LookupError>;
}

/// Offline lookup backed by a JSON object mapping postal codes to addresses.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: HashMap<String, Address>,
}

impl AddressBook {
    pub fn from_path(path: &Path) -> Result<Self, LookupError> {
        let file = File::open(path).map_err(|source| LookupError::Unreadable {
            path: path.to_owned(),
            source,
        })?;
        let entries = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            LookupError::Malformed {
                path: path.to_owned(),
                source,
            }
        })?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Address)> for AddressBook {
    fn from_iter<T: IntoIterator<Item = (String, Address)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl AddressLookup for AddressBook {
    fn lookup(&self, postal_code: &str) -> Result<Address, LookupError> {
        let code = postal_code.trim();
        if code.len() != 8 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LookupError::InvalidPostalCode(code.to_owned()));
        }
        self.entries
            .get(code)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(code.to_owned()))
    }
}
