mod client;
pub mod http;
pub mod query;
mod types;

pub use client::{
    BitsLeaderboardOptions, LifecycleState, RequestOptions, StreamsOptions, TwitchClient,
};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use types::*;
