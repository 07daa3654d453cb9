//! Accounting, treasury and taxes.
//!
//! - chart of accounts and journal entries (one side per entry row)
//! - trial balance derived from entries (debit-positive convention)
//! - bank accounts and dated income/expense transactions
//! - tax obligations per period and the VAT summary

pub mod balance;
pub mod chart;
pub mod entry;
pub mod tax;
pub mod treasury;

pub use balance::{AccountBalance, trial_balance};
pub use chart::{AccountId, AccountRef, AccountType, ChartAccount, ChartAccountInput};
pub use entry::{AccountingEntry, AccountingEntryInput, EntryId};
pub use tax::{Period, TaxId, TaxInput, TaxObligation, TaxStatus, TaxType, VatSummary};
pub use treasury::{
    BankAccount, BankAccountId, BankAccountInput, BankAccountRef, BankBalance,
    FinancialTransaction, TransactionId, TransactionInput, TransactionStatus, TransactionType,
    bank_balances,
};
