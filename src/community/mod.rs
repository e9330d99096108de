pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum CommunityError {
    #[error("community not found")]
    NotFound,

    #[error("already a member")]
    AlreadyMember,

    #[error("not a member")]
    NotMember,

    #[error("name cannot be empty")]
    EmptyName,

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
