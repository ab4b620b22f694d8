mod accounts;

pub use accounts::AccountStore;
