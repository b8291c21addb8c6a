use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Twitch user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub user_type: String,
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Represents a live stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub game_id: String,
    pub game_name: String,
    pub title: String,
    pub viewer_count: i64,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub language: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Represents a followed channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedChannel {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    pub followed_at: DateTime<Utc>,
}

/// A broadcaster subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub broadcaster_id: String,
    pub broadcaster_login: String,
    pub broadcaster_name: String,
    #[serde(default)]
    pub gifter_id: String,
    #[serde(default)]
    pub gifter_name: String,
    pub is_gift: bool,
    pub tier: String,
    #[serde(default)]
    pub plan_name: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
}

/// One entry in the bits leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitsLeader {
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub rank: i64,
    pub score: i64,
}

/// Reporting window of a bits leaderboard response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Helix API pagination, passed through to callers untouched
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Pagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Users response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<User>,
}

/// Streams response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<Stream>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Followed channels response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedChannelsResponse {
    pub data: Vec<FollowedChannel>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Broadcaster subscriptions response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionsResponse {
    pub data: Vec<Subscription>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Bits leaderboard response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitsLeaderboardResponse {
    pub data: Vec<BitsLeader>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub total: Option<i64>,
}
