pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("email already in use")]
    EmailTaken,

    #[error("username already in use")]
    UsernameTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username cannot be empty")]
    InvalidUsername,

    #[error("hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),
}
