use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    account::{Account, AccountError, AccountFactory, AccountNumber, CheckingLimits},
    customer::{Cpf, Customer, CustomerError},
    transaction::Transaction,
};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("Customer {0} not found")]
    UnknownCustomer(Cpf),
    #[error("A customer with CPF {0} already exists")]
    DuplicateCustomer(Cpf),
    #[error(transparent)]
    CustomerErr(#[from] CustomerError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
}

/// Contradictions a stored state can contain even when it parses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("customer {0} appears more than once")]
    DuplicateCustomer(Cpf),
    #[error("account {number} is listed under customer {customer} but owned by {owner}")]
    MisfiledAccount {
        number: AccountNumber,
        customer: Cpf,
        owner: Cpf,
    },
    #[error("account number {0} is used more than once")]
    DuplicateAccount(AccountNumber),
    #[error("next account number {next} is not above existing account {highest}")]
    StaleSequence {
        next: AccountNumber,
        highest: AccountNumber,
    },
}

/// Everything that is persisted between runs: the customers with their
/// accounts and the account-number sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bank {
    #[serde(default)]
    customers: Vec<Customer>,
    #[serde(flatten)]
    accounts: AccountFactory,
    /// Limits given to newly opened checking accounts; existing accounts keep
    /// the limits they were opened with.
    #[serde(skip)]
    limits: CheckingLimits,
}

impl Bank {
    pub fn with_limits(mut self, limits: CheckingLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> CheckingLimits {
        self.limits
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, cpf: &Cpf) -> Option<&Customer> {
        self.customers.iter().find(|c| c.cpf() == cpf)
    }

    fn customer_mut(&mut self, cpf: &Cpf) -> Result<&mut Customer, BankError> {
        self.customers
            .iter_mut()
            .find(|c| c.cpf() == cpf)
            .ok_or_else(|| BankError::UnknownCustomer(cpf.clone()))
    }

    /// Every account with its holder, in customer then opening order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Customer, &Account)> {
        self.customers
            .iter()
            .flat_map(|c| c.accounts().iter().map(move |acc| (c, acc)))
    }

    /// Checks the invariants that opening accounts and routing transactions
    /// rely on: unique customers, unique account numbers filed under their
    /// owner, and a number sequence ahead of every existing account.
    pub fn check_consistency(&self) -> Result<(), StateError> {
        let mut cpfs = HashSet::new();
        let mut numbers = HashSet::new();
        for customer in &self.customers {
            if !cpfs.insert(customer.cpf()) {
                return Err(StateError::DuplicateCustomer(customer.cpf().clone()));
            }
            for acc in customer.accounts() {
                if acc.owner() != customer.cpf() {
                    return Err(StateError::MisfiledAccount {
                        number: acc.number(),
                        customer: customer.cpf().clone(),
                        owner: acc.owner().clone(),
                    });
                }
                if !numbers.insert(acc.number()) {
                    return Err(StateError::DuplicateAccount(acc.number()));
                }
            }
        }
        if let Some(&highest) = numbers.iter().max() {
            let next = self.accounts.next_number();
            if next <= highest {
                return Err(StateError::StaleSequence { next, highest });
            }
        }
        Ok(())
    }

    pub fn register_customer(&mut self, customer: Customer) -> Result<(), BankError> {
        if self.customer(customer.cpf()).is_some() {
            return Err(BankError::DuplicateCustomer(customer.cpf().clone()));
        }
        tracing::info!(cpf = %customer.cpf(), "customer registered");
        self.customers.push(customer);
        Ok(())
    }

    /// Opens a checking account for `cpf`. A positive `initial_deposit` is
    /// registered as the account's first deposit; zero opens it empty.
    pub fn open_account(
        &mut self,
        cpf: &Cpf,
        initial_deposit: Decimal,
    ) -> Result<AccountNumber, BankError> {
        if initial_deposit < Decimal::ZERO {
            return Err(AccountError::InvalidAmount {
                amount: initial_deposit,
            }
            .into());
        }
        // resolve the customer first so a failure doesn't burn an account number
        let limits = self.limits;
        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.cpf() == cpf)
            .ok_or_else(|| BankError::UnknownCustomer(cpf.clone()))?;

        let mut account = self.accounts.open_checking(cpf.clone(), limits)?;
        if initial_deposit > Decimal::ZERO {
            Transaction::Deposit(initial_deposit).register_logged(&mut account)?;
        }
        let number = account.number();
        customer.add_account(account)?;
        tracing::info!(cpf = %cpf, account = %number, "account opened");
        Ok(number)
    }

    pub fn perform_transaction(
        &mut self,
        cpf: &Cpf,
        number: AccountNumber,
        transaction: Transaction,
    ) -> Result<(), BankError> {
        self.customer_mut(cpf)?
            .perform_transaction(number, transaction)?;
        Ok(())
    }

    pub fn deposit(
        &mut self,
        cpf: &Cpf,
        number: AccountNumber,
        amount: Decimal,
    ) -> Result<(), BankError> {
        self.perform_transaction(cpf, number, Transaction::Deposit(amount))
    }

    pub fn withdraw(
        &mut self,
        cpf: &Cpf,
        number: AccountNumber,
        amount: Decimal,
    ) -> Result<(), BankError> {
        self.perform_transaction(cpf, number, Transaction::Withdrawal(amount))
    }
}
