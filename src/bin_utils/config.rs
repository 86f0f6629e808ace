use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;

use crate::{
    account::CheckingLimits,
    address::{AddressBook, AddressLookup},
};

/// Interactive ledger for customers and their checking accounts
#[derive(Debug, Parser)]
#[command(version)]
pub struct Config {
    /// JSON file holding customers and accounts
    #[arg(long, env = "TINY_BANK_DATA", default_value = "bank_data.json")]
    pub data_file: PathBuf,

    /// Largest single withdrawal allowed on new checking accounts
    #[arg(long, env = "TINY_BANK_WITHDRAWAL_LIMIT", default_value = "500")]
    pub withdrawal_limit: Decimal,

    /// Withdrawals allowed per day on new checking accounts
    #[arg(long, env = "TINY_BANK_MAX_DAILY_WITHDRAWALS", default_value_t = 3)]
    pub max_daily_withdrawals: u32,

    /// JSON file mapping postal codes to addresses
    #[arg(long, env = "TINY_BANK_ADDRESS_BOOK")]
    pub address_book: Option<PathBuf>,
}

impl Config {
    pub fn limits(&self) -> CheckingLimits {
        CheckingLimits {
            withdrawal_limit: self.withdrawal_limit,
            max_daily_withdrawals: self.max_daily_withdrawals,
        }
    }

    /// Loads the configured address book. Lookup is optional, so a book that
    /// cannot be read only disables it.
    pub fn address_lookup(&self) -> Option<Box<dyn AddressLookup>> {
        let path = self.address_book.as_ref()?;
        match AddressBook::from_path(path) {
            Ok(book) => {
                tracing::info!(path = %path.display(), entries = book.len(), "address book loaded");
                Some(Box::new(book))
            }
            Err(err) => {
                tracing::warn!(%err, "address lookup disabled");
                None
            }
        }
    }
}
