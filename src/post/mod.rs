pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("community not found")]
    CommunityNotFound,

    #[error("post not found")]
    NotFound,

    #[error("already liked")]
    AlreadyLiked,

    #[error("author is not a member")]
    NotMember,

    #[error("content cannot be empty")]
    EmptyContent,

    #[error("image is not a valid url")]
    InvalidImage,

    #[error("date is not a valid calendar date")]
    InvalidDate,

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
