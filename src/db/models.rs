use serde::{Deserialize, Serialize};

/// A registered account. The wire shape matches what browser clients
/// expect, so field names serialize as camelCase and the password hash
/// never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display names of current members, in join order.
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub community_id: String,
    pub author: String,
    pub content: String,
    pub image: Option<String>,
    /// Calendar date of the post, `YYYY-MM-DD`.
    pub date: String,
    pub likes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_name: String,
    pub actor_name: String,
    pub post_id: String,
    pub kind: String,
    pub content: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}
