//! Interactive front end for [`crate::bank`]. It lives in the library so the
//! integration tests can drive a whole session over in-memory streams.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    account::{AccountNumber, CheckingLimits},
    address::AddressLookup,
    bank::{Bank, BankError},
    customer::{Cpf, Customer, CustomerError},
    repository::{Repository, RepositoryError},
};
use console::{Console, ConsoleError};
use menu::{MENU, MenuChoice};
use statement::{AccountSummary, print_accounts, print_statement};

pub mod config;
pub mod console;
pub mod menu;
pub mod statement;

const BIRTH_DATE_FORMAT: &str = "%d-%m-%Y";

/// Failures of a single menu action. Everything except a broken console is
/// reported to the user and the menu continues.
#[derive(Debug, Error)]
enum ActionError {
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
    #[error("{0}")]
    Rejected(String),
}

impl From<CustomerError> for ActionError {
    fn from(err: CustomerError) -> Self {
        Self::Bank(err.into())
    }
}

pub struct Service<'w, R, W: 'w, S> {
    pub input: R,
    pub output: &'w mut W,
    pub repository: S,
    pub address_lookup: Option<Box<dyn AddressLookup>>,
    pub limits: CheckingLimits,
}

impl<'w, R, W, S> Service<'w, R, W, S>
where
    R: BufRead,
    W: Write + 'w,
    S: Repository,
{
    /// Loads the bank, runs the menu until exit or end of input, and saves on
    /// the way out. Unreadable state at startup aborts before the menu opens.
    pub fn run(mut self) -> Result<Bank> {
        let bank = self
            .repository
            .load()
            .context("Failed to load bank state")?
            .unwrap_or_default()
            .with_limits(self.limits);
        tracing::info!(customers = bank.customers().len(), "bank ready");

        let mut session = Session {
            console: Console::new(self.input, self.output),
            bank,
            repository: self.repository,
            address_lookup: self.address_lookup,
        };
        session.run_menu()?;

        session
            .repository
            .save(&session.bank)
            .context("Failed to save bank state on exit")?;
        tracing::info!("bank state saved, exiting");
        Ok(session.bank)
    }
}

struct Session<R, W, S> {
    console: Console<R, W>,
    bank: Bank,
    repository: S,
    address_lookup: Option<Box<dyn AddressLookup>>,
}

impl<R, W, S> Session<R, W, S>
where
    R: BufRead,
    W: Write,
    S: Repository,
{
    fn run_menu(&mut self) -> Result<()> {
        loop {
            let choice = match self.console.ask(MENU) {
                Ok(answer) => answer,
                Err(ConsoleError::Closed) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            let outcome = match choice.parse::<MenuChoice>() {
                Ok(MenuChoice::Exit) => return Ok(()),
                Ok(MenuChoice::CreateCustomer) => self.create_customer(),
                Ok(MenuChoice::CreateAccount) => self.create_account(),
                Ok(MenuChoice::Deposit) => self.deposit(),
                Ok(MenuChoice::Withdraw) => self.withdraw(),
                Ok(MenuChoice::Statement) => self.statement(),
                Ok(MenuChoice::ListAccounts) => self.list_accounts(),
                Err(_) => Err(ActionError::Rejected(
                    "Invalid operation, please select one of the listed options.".to_owned(),
                )),
            };
            match outcome {
                Ok(()) => {}
                Err(ActionError::Console(ConsoleError::Closed)) => return Ok(()),
                Err(ActionError::Console(ConsoleError::Io(err))) => {
                    return Err(err).context("Console is no longer usable");
                }
                Err(err) => {
                    tracing::debug!(%err, "menu action rejected");
                    self.console.say(format_args!("\n@@@ {err} @@@"))?;
                }
            }
        }
    }

    /// Failing to save is reported but does not undo the operation; the next
    /// successful save or the save on exit persists it.
    fn persist(&mut self) -> Result<(), ActionError> {
        self.repository
            .save(&self.bank)
            .inspect_err(|err| tracing::error!(%err, "failed to save bank state"))?;
        Ok(())
    }

    fn success(&mut self, message: impl std::fmt::Display) -> Result<(), ActionError> {
        self.console
            .say(format_args!("\n=== {message} ==="))
            .map_err(|err| ConsoleError::Io(err).into())
    }

    fn ask_customer(&mut self) -> Result<Cpf, ActionError> {
        let cpf: Cpf = self.console.ask_parsed("Customer CPF: ", "CPF")?;
        if self.bank.customer(&cpf).is_none() {
            return Err(BankError::UnknownCustomer(cpf).into());
        }
        Ok(cpf)
    }

    /// Lists the customer's accounts and asks until one of them is picked.
    fn ask_account(&mut self, cpf: &Cpf) -> Result<AccountNumber, ActionError> {
        let numbers: Vec<(String, AccountNumber)> = self
            .bank
            .customer(cpf)
            .map(|c| {
                c.accounts()
                    .iter()
                    .map(|acc| (acc.branch().to_owned(), acc.number()))
                    .collect()
            })
            .unwrap_or_default();
        if numbers.is_empty() {
            return Err(ActionError::Rejected(
                "Customer has no accounts!".to_owned(),
            ));
        }

        self.console.say("Available accounts:").map_err(ConsoleError::Io)?;
        for (branch, number) in &numbers {
            self.console
                .say(format_args!("  Branch: {branch}, Account: {number}"))
                .map_err(ConsoleError::Io)?;
        }
        loop {
            match self
                .console
                .ask_parsed::<AccountNumber>("Account number: ", "account number")
            {
                Ok(number) if numbers.iter().any(|(_, n)| *n == number) => return Ok(number),
                Ok(_) | Err(ConsoleError::Invalid { .. }) => {
                    self.console
                        .say("Invalid option. Enter one of the listed account numbers.")
                        .map_err(ConsoleError::Io)?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn ask_amount(&mut self, prompt: &str) -> Result<Decimal, ActionError> {
        Ok(self.console.ask_parsed(prompt, "amount")?)
    }

    fn ask_birth_date(&mut self) -> Result<NaiveDate, ActionError> {
        loop {
            let raw = self.console.ask("Birth date (dd-mm-yyyy): ")?;
            match NaiveDate::parse_from_str(&raw, BIRTH_DATE_FORMAT) {
                Ok(date) => return Ok(date),
                Err(_) => self
                    .console
                    .say("Invalid birth date. Use the dd-mm-yyyy format.")
                    .map_err(ConsoleError::Io)?,
            }
        }
    }

    /// Resolves the postal code when a lookup is configured; any lookup
    /// failure falls back to typing the address.
    fn ask_address(&mut self) -> Result<String, ActionError> {
        if let Some(lookup) = &self.address_lookup {
            let postal_code = self.console.ask("Postal code (8 digits): ")?;
            match lookup.lookup(&postal_code) {
                Ok(address) => {
                    self.console
                        .say(format_args!("Address found: {address}"))
                        .map_err(ConsoleError::Io)?;
                    let number = self.console.ask("Number: ")?;
                    return Ok(format!("{address}, {number}"));
                }
                Err(err) => {
                    tracing::warn!(%err, "address lookup failed");
                    self.console
                        .say(format_args!("Address lookup failed: {err}"))
                        .map_err(ConsoleError::Io)?;
                }
            }
        }
        let address = self.console.ask("Address (street, number - district - city/state): ")?;
        if address.is_empty() {
            return Err(ActionError::Rejected("Address must not be empty.".to_owned()));
        }
        Ok(address)
    }

    fn create_customer(&mut self) -> Result<(), ActionError> {
        let cpf: Cpf = self.console.ask_parsed("CPF (numbers only): ", "CPF")?;
        if self.bank.customer(&cpf).is_some() {
            return Err(BankError::DuplicateCustomer(cpf).into());
        }
        let name = self.console.ask("Full name: ")?;
        if name.is_empty() {
            return Err(ActionError::Rejected("Name must not be empty.".to_owned()));
        }
        let birth_date = self.ask_birth_date()?;
        let address = self.ask_address()?;

        self.bank
            .register_customer(Customer::new(cpf, name, birth_date, address))?;
        self.persist()?;
        self.success("Customer created successfully!")
    }

    fn create_account(&mut self) -> Result<(), ActionError> {
        let cpf = self.ask_customer()?;
        let initial = self.ask_amount("Initial deposit (0 for none): ")?;
        let number = self.bank.open_account(&cpf, initial)?;
        self.persist()?;
        self.success(format_args!("Account {number} created successfully!"))
    }

    fn deposit(&mut self) -> Result<(), ActionError> {
        let cpf = self.ask_customer()?;
        let amount = self.ask_amount("Deposit amount: ")?;
        let number = self.ask_account(&cpf)?;
        self.bank.deposit(&cpf, number, amount)?;
        self.persist()?;
        self.success("Deposit completed successfully!")
    }

    fn withdraw(&mut self) -> Result<(), ActionError> {
        let cpf = self.ask_customer()?;
        let amount = self.ask_amount("Withdrawal amount: ")?;
        let number = self.ask_account(&cpf)?;
        self.bank.withdraw(&cpf, number, amount)?;
        self.persist()?;
        self.success("Withdrawal completed successfully!")
    }

    fn statement(&mut self) -> Result<(), ActionError> {
        let cpf = self.ask_customer()?;
        let number = self.ask_account(&cpf)?;
        let account = self
            .bank
            .customer(&cpf)
            .and_then(|c| c.account(number))
            .ok_or_else(|| CustomerError::AccountNotOwned {
                cpf: cpf.clone(),
                number,
            })?;
        print_statement(self.console.output(), account).map_err(ConsoleError::Io)?;
        Ok(())
    }

    fn list_accounts(&mut self) -> Result<(), ActionError> {
        let summaries = self.bank.accounts().map(|(customer, acc)| AccountSummary {
            branch: acc.branch(),
            number: acc.number(),
            holder: customer.name(),
        });
        print_accounts(self.console.output(), summaries).map_err(ConsoleError::Io)?;
        Ok(())
    }
}
