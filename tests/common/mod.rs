//! Common test utilities for integration tests

use twitch_client::ClientConfig;

/// Creates a valid user-mode configuration
pub fn user_config() -> ClientConfig {
    ClientConfig {
        client_id: "test_client_id".to_string(),
        client_secret: Some("test_secret".to_string()),
        access_token: Some("test_token".to_string()),
        refresh_token: Some("test_refresh".to_string()),
        app_mode: false,
    }
}

/// Creates a valid app-mode configuration
pub fn app_config() -> ClientConfig {
    ClientConfig {
        client_id: "test_client_id".to_string(),
        client_secret: Some("test_secret".to_string()),
        access_token: None,
        refresh_token: None,
        app_mode: true,
    }
}
