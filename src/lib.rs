/// Balance bookkeeping for a single account, including the withdrawal policy
/// of checking accounts.
pub mod account;

/// Ordered record of what was applied to an account.
pub mod history;

/// Deposits and withdrawals, and how they are registered on an account.
pub mod transaction;

/// Customers own their accounts and route transactions to them.
pub mod customer;

/// All customers plus the account-number sequence; the unit that gets persisted.
pub mod bank;

/// Load/save interface for [`bank::Bank`], with JSON file and in-memory
/// implementations.
pub mod repository;

/// Postal-code lookup used when registering customers.
pub mod address;

/// The interactive menu and its configuration. Kept in the library so the
/// integration tests can run whole sessions.
pub mod bin_utils;
