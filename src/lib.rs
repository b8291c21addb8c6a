// Client library for the Twitch Helix API
// Handles OAuth token lifecycle, authenticated dispatch, and typed endpoint wrappers

pub mod auth;
pub mod error;
pub mod events;
pub mod twitch;

pub use auth::{AuthMode, ClientConfig, Credentials};
pub use error::{ApiError, ClientError};
pub use events::{ClientEvent, TokenPayload};
pub use twitch::TwitchClient;
