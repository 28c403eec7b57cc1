pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::account;
pub use domain::auth;
pub use domain::ledger;
pub use outbound::repositories;
