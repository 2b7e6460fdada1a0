pub mod accounts;
pub mod token;

pub use accounts::{Account, AccountStore};
pub use token::{Claims, DEFAULT_TOKEN_TTL, TokenIssuer};
