use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    account::{Account, AccountError, AccountNumber},
    transaction::Transaction,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomerError {
    #[error("CPF must have exactly 11 digits, got `{0}`")]
    InvalidCpf(String),
    #[error("Account {number} does not belong to customer {cpf}")]
    AccountNotOwned { cpf: Cpf, number: AccountNumber },
    #[error(transparent)]
    AccountErr(#[from] AccountError),
}

/// Individual taxpayer id, the key customers are looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Cpf {
    type Err = CustomerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 11 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(CustomerError::InvalidCpf(s.to_owned()))
        }
    }
}

impl TryFrom<String> for Cpf {
    type Error = CustomerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    cpf: Cpf,
    name: String,
    birth_date: NaiveDate,
    address: String,
    #[serde(default)]
    accounts: Vec<Account>,
}

impl Customer {
    pub fn new(cpf: Cpf, name: String, birth_date: NaiveDate, address: String) -> Self {
        Self {
            cpf,
            name,
            birth_date,
            address,
            accounts: Vec::new(),
        }
    }

    pub fn cpf(&self) -> &Cpf {
        &self.cpf
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts.iter().find(|acc| acc.number() == number)
    }

    /// Accounts are bound to their owner when opened, so only accounts opened
    /// for this customer can be added.
    pub fn add_account(&mut self, account: Account) -> Result<(), CustomerError> {
        if account.owner() != &self.cpf {
            return Err(CustomerError::AccountNotOwned {
                cpf: self.cpf.clone(),
                number: account.number(),
            });
        }
        self.accounts.push(account);
        Ok(())
    }

    pub fn perform_transaction(
        &mut self,
        number: AccountNumber,
        transaction: Transaction,
    ) -> Result<(), CustomerError> {
        let Some(account) = self.accounts.iter_mut().find(|acc| acc.number() == number) else {
            return Err(CustomerError::AccountNotOwned {
                cpf: self.cpf.clone(),
                number,
            });
        };
        transaction.register_logged(account)?;
        Ok(())
    }
}
