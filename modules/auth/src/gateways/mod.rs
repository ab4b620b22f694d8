mod remote;
mod static_accounts;

pub use remote::RemoteAuthGate;
pub use static_accounts::StaticAuthGate;
