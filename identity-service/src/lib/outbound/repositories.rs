pub mod account;
pub mod token_ledger;
