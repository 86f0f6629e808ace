use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => f.write_str("Deposit"),
            TransactionKind::Withdrawal => f.write_str("Withdrawal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Deposit(Decimal),
    Withdrawal(Decimal),
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: Decimal) -> Self {
        match kind {
            TransactionKind::Deposit => Self::Deposit(amount),
            TransactionKind::Withdrawal => Self::Withdrawal(amount),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Deposit(_) => TransactionKind::Deposit,
            Self::Withdrawal(_) => TransactionKind::Withdrawal,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Self::Deposit(amount) | Self::Withdrawal(amount) => *amount,
        }
    }

    /// Applies the transaction to `account`. The account records it in its
    /// history only when the operation succeeds.
    pub fn register(&self, account: &mut Account) -> Result<(), AccountError> {
        match *self {
            Self::Deposit(amount) => account.deposit(amount),
            Self::Withdrawal(amount) => account.withdraw(amount),
        }
    }

    pub fn register_at(&self, account: &mut Account, at: NaiveDateTime) -> Result<(), AccountError> {
        match *self {
            Self::Deposit(amount) => account.deposit_at(amount, at),
            Self::Withdrawal(amount) => account.withdraw_at(amount, at),
        }
    }

    /// [`Transaction::register`] with the account state logged before and after.
    pub fn register_logged(&self, account: &mut Account) -> Result<(), AccountError> {
        let balance_before = account.balance();
        tracing::info!(
            account = %account.number(),
            kind = %self.kind(),
            amount = %self.amount(),
            balance = %balance_before,
            "registering transaction"
        );
        match self.register(account) {
            Ok(()) => {
                tracing::info!(
                    account = %account.number(),
                    kind = %self.kind(),
                    balance_before = %balance_before,
                    balance_after = %account.balance(),
                    "transaction registered"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    account = %account.number(),
                    kind = %self.kind(),
                    error = %err,
                    "transaction rejected"
                );
                Err(err)
            }
        }
    }
}
