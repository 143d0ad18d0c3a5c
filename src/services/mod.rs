pub mod credentials;
pub mod titles;

pub use credentials::{CredentialError, CredentialStore, Credentials};
pub use titles::{DisabledTitleResolver, HttpTitleResolver, TitleResolver};
