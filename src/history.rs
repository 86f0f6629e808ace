use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::{Transaction, TransactionKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub at: NaiveDateTime,
}

impl HistoryEntry {
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.kind, self.amount)
    }
}

/// Append-only record of the transactions applied to one account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn add(&mut self, transaction: Transaction, at: NaiveDateTime) {
        self.entries.push(HistoryEntry {
            kind: transaction.kind(),
            amount: transaction.amount(),
            at,
        });
    }

    /// Entries in insertion order. The iterator is `Clone`, so a statement can
    /// walk it more than once.
    pub fn entries(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
