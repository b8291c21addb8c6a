mod credentials;
pub(crate) mod flow;

pub use credentials::{AuthMode, ClientConfig, Credentials};
pub use flow::{AuthError, TokenResponse, ValidateResponse};
