use std::fmt;

use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{customer::Cpf, history::History, transaction::Transaction};

/// Every account opened by this bank lives in the same branch.
pub const BRANCH_CODE: &str = "0001";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct AccountNumber(u32);

impl AccountNumber {
    pub fn new(number: u32) -> Self {
        Self(number)
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
    #[error("Withdrawal of {amount} exceeds the per-withdrawal limit of {limit}")]
    LimitExceeded { amount: Decimal, limit: Decimal },
    #[error("Daily limit of {max} withdrawals reached")]
    DailyLimitExceeded { max: u32 },
    #[error("Depositing {amount} would overflow the balance of {balance}")]
    BalanceOverflow { amount: Decimal, balance: Decimal },
    #[error("No account numbers left after {last}")]
    AccountNumbersExhausted { last: AccountNumber },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckingLimits {
    pub withdrawal_limit: Decimal,
    pub max_daily_withdrawals: u32,
}

impl Default for CheckingLimits {
    fn default() -> Self {
        Self {
            withdrawal_limit: Decimal::new(500, 0),
            max_daily_withdrawals: 3,
        }
    }
}

/// Withdrawal policy of a checking account, plus the counter it enforces.
/// The counter never resets: every successful withdrawal uses up the quota.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checking {
    limits: CheckingLimits,
    withdrawals_made: u32,
}

impl Checking {
    pub fn new(limits: CheckingLimits) -> Self {
        Self {
            limits,
            withdrawals_made: 0,
        }
    }

    pub fn limits(&self) -> CheckingLimits {
        self.limits
    }

    pub fn withdrawals_made(&self) -> u32 {
        self.withdrawals_made
    }

    fn check(&self, amount: Decimal) -> Result<(), AccountError> {
        if amount > self.limits.withdrawal_limit {
            return Err(AccountError::LimitExceeded {
                amount,
                limit: self.limits.withdrawal_limit,
            });
        }
        if self.withdrawals_made >= self.limits.max_daily_withdrawals {
            return Err(AccountError::DailyLimitExceeded {
                max: self.limits.max_daily_withdrawals,
            });
        }
        Ok(())
    }

    fn count(&mut self) {
        self.withdrawals_made += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AccountKind {
    Plain,
    Checking(Checking),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    number: AccountNumber,
    branch: String,
    owner: Cpf,
    balance: Decimal,
    kind: AccountKind,
    history: History,
}

impl Account {
    pub fn new(number: AccountNumber, owner: Cpf, kind: AccountKind) -> Self {
        Self {
            number,
            branch: BRANCH_CODE.to_owned(),
            owner,
            balance: Decimal::ZERO,
            kind,
            history: History::default(),
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn owner(&self) -> &Cpf {
        &self.owner
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.deposit_at(amount, Local::now().naive_local())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.withdraw_at(amount, Local::now().naive_local())
    }

    pub fn deposit_at(&mut self, amount: Decimal, at: NaiveDateTime) -> Result<(), AccountError> {
        check_positive(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow {
                amount,
                balance: self.balance,
            })?;
        self.history.add(Transaction::Deposit(amount), at);
        Ok(())
    }

    /// Checking accounts apply their own policy before the balance check, and
    /// only successful withdrawals count against the daily limit.
    pub fn withdraw_at(&mut self, amount: Decimal, at: NaiveDateTime) -> Result<(), AccountError> {
        check_positive(amount)?;
        if let AccountKind::Checking(checking) = &self.kind {
            checking.check(amount)?;
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        if let AccountKind::Checking(checking) = &mut self.kind {
            checking.count();
        }
        self.history.add(Transaction::Withdrawal(amount), at);
        Ok(())
    }
}

fn check_positive(amount: Decimal) -> Result<(), AccountError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(AccountError::InvalidAmount { amount })
    }
}

/// Hands out account numbers in sequence and binds each new account to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountFactory {
    next_account_number: AccountNumber,
}

impl Default for AccountFactory {
    fn default() -> Self {
        Self {
            next_account_number: AccountNumber(1),
        }
    }
}

impl AccountFactory {
    pub fn next_number(&self) -> AccountNumber {
        self.next_account_number
    }

    pub fn open_checking(
        &mut self,
        owner: Cpf,
        limits: CheckingLimits,
    ) -> Result<Account, AccountError> {
        let number = self.next_account_number;
        let next = number
            .0
            .checked_add(1)
            .ok_or(AccountError::AccountNumbersExhausted { last: number })?;
        self.next_account_number = AccountNumber(next);
        Ok(Account::new(
            number,
            owner,
            AccountKind::Checking(Checking::new(limits)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn owner() -> Cpf {
        "12345678901".parse().unwrap()
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn checking_with(balance: i64, limit: i64, max: u32) -> Account {
        let mut acc = AccountFactory::default().open_checking(
            owner(),
            CheckingLimits {
                withdrawal_limit: Decimal::from(limit),
                max_daily_withdrawals: max,
            },
        )
        .unwrap();
        acc.deposit_at(Decimal::from(balance), noon()).unwrap();
        acc
    }

    #[test]
    fn deposit_and_withdraw_plain_account() {
        let mut acc = Account::new(AccountNumber::new(7), owner(), AccountKind::Plain);
        assert_eq!(acc.branch(), BRANCH_CODE);
        acc.deposit(Decimal::from(50)).unwrap();
        acc.withdraw(Decimal::from(20)).unwrap();
        assert_eq!(acc.balance(), Decimal::from(30));
        assert_eq!(acc.history().len(), 2);

        // plain accounts have no per-withdrawal ceiling
        acc.deposit(Decimal::from(10_000)).unwrap();
        acc.withdraw(Decimal::from(9_000)).unwrap();
        assert_eq!(acc.balance(), Decimal::from(1_030));
    }

    #[test]
    fn reject_non_positive_amounts() {
        let mut acc = checking_with(100, 500, 3);
        let err = acc.deposit(Decimal::from(-10)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidAmount {
                amount: Decimal::from(-10)
            }
        );
        assert!(matches!(
            acc.withdraw(Decimal::ZERO).unwrap_err(),
            AccountError::InvalidAmount { .. }
        ));
        assert_eq!(acc.balance(), Decimal::from(100));
        assert_eq!(acc.history().len(), 1);
    }

    #[test]
    fn reject_deposit_overflowing_balance() {
        let mut acc = Account::new(AccountNumber::new(3), owner(), AccountKind::Plain);
        acc.deposit(Decimal::MAX).unwrap();
        let err = acc.deposit(Decimal::MAX).unwrap_err();
        assert_eq!(
            err,
            AccountError::BalanceOverflow {
                amount: Decimal::MAX,
                balance: Decimal::MAX,
            }
        );
        assert_eq!(acc.balance(), Decimal::MAX);
        assert_eq!(acc.history().len(), 1);
    }

    #[test]
    fn withdraw_never_overdraws() {
        let mut acc = checking_with(100, 500, 3);
        let err = acc.withdraw_at(Decimal::from(101), noon()).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                requested: Decimal::from(101),
                available: Decimal::from(100),
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 101, available 100"
        );
        acc.withdraw_at(Decimal::from(100), noon()).unwrap();
        assert_eq!(acc.balance(), Decimal::ZERO);
    }

    #[test]
    fn checking_limits_withdrawal_amount() {
        let mut acc = checking_with(1000, 500, 3);
        let err = acc.withdraw_at(Decimal::from(501), noon()).unwrap_err();
        assert!(matches!(err, AccountError::LimitExceeded { .. }));
        assert_eq!(acc.balance(), Decimal::from(1000));
        acc.withdraw_at(Decimal::from(500), noon()).unwrap();
        assert_eq!(acc.balance(), Decimal::from(500));
    }

    #[test]
    fn checking_limits_daily_withdrawals() {
        let mut acc = checking_with(1000, 500, 3);
        for _ in 0..3 {
            acc.withdraw_at(Decimal::from(100), noon()).unwrap();
        }
        assert_eq!(acc.balance(), Decimal::from(700));
        let err = acc.withdraw_at(Decimal::from(100), noon()).unwrap_err();
        assert_eq!(err, AccountError::DailyLimitExceeded { max: 3 });
        assert_eq!(acc.balance(), Decimal::from(700));
        // one deposit plus three withdrawals
        assert_eq!(acc.history().len(), 4);
    }

    #[test]
    fn failed_withdrawals_do_not_count() {
        let mut acc = checking_with(100, 500, 1);
        acc.withdraw_at(Decimal::from(200), noon()).unwrap_err();
        acc.withdraw_at(Decimal::from(50), noon()).unwrap();
        let AccountKind::Checking(checking) = acc.kind() else {
            panic!("expected checking account");
        };
        assert_eq!(checking.withdrawals_made(), 1);
        assert_eq!(checking.limits().max_daily_withdrawals, 1);
    }

    #[test]
    fn withdrawal_quota_spans_midnight() {
        let mut acc = checking_with(1000, 500, 3);
        let before_midnight = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let after_midnight = before_midnight + Duration::minutes(2);

        acc.withdraw_at(Decimal::from(100), before_midnight).unwrap();
        acc.withdraw_at(Decimal::from(100), before_midnight).unwrap();
        acc.withdraw_at(Decimal::from(100), after_midnight).unwrap();
        let err = acc
            .withdraw_at(Decimal::from(100), after_midnight)
            .unwrap_err();
        assert_eq!(err, AccountError::DailyLimitExceeded { max: 3 });
        assert_eq!(acc.balance(), Decimal::from(700));
    }

    #[test]
    fn deposit_then_withdraw_restores_balance() {
        let mut acc = checking_with(250, 500, 3);
        let amount = Decimal::new(12_345, 2);
        acc.deposit_at(amount, noon()).unwrap();
        acc.withdraw_at(amount, noon()).unwrap();
        assert_eq!(acc.balance(), Decimal::from(250));
    }

    #[test]
    fn factory_assigns_sequential_numbers() {
        let mut factory = AccountFactory::default();
        let first = factory
            .open_checking(owner(), CheckingLimits::default())
            .unwrap();
        let second = factory
            .open_checking(owner(), CheckingLimits::default())
            .unwrap();
        assert_eq!(first.number(), AccountNumber::new(1));
        assert_eq!(second.number(), AccountNumber::new(2));
        assert_eq!(factory.next_number(), AccountNumber::new(3));
        assert_eq!(second.owner(), &owner());
    }

    #[test]
    fn factory_stops_at_last_number() {
        let mut factory = AccountFactory {
            next_account_number: AccountNumber::new(u32::MAX),
        };
        let err = factory
            .open_checking(owner(), CheckingLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            AccountError::AccountNumbersExhausted {
                last: AccountNumber::new(u32::MAX)
            }
        );
        assert_eq!(factory.next_number(), AccountNumber::new(u32::MAX));
    }
}
