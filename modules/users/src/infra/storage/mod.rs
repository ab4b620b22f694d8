mod accounts;

pub use accounts::AccountsRepository;
