use bcrypt::{hash, verify, DEFAULT_COST};
use rusqlite::{params, OptionalExtension, Row};

use super::AccountError;
use crate::db::models::User;
use crate::state::DbPool;

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

/// Register a new account. The password is stored as a bcrypt hash.
pub fn register(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AccountError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AccountError::InvalidUsername);
    }

    let conn = pool.get()?;

    let email_taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    if email_taken {
        return Err(AccountError::EmailTaken);
    }

    let username_taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    if username_taken {
        return Err(AccountError::UsernameTaken);
    }

    let password_hash = hash(password, DEFAULT_COST)?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO users (id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, username, email, password_hash],
    )?;

    let user = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![id],
        map_user,
    )?;
    Ok(user)
}

/// Check credentials against the stored hash. Lookup is by email.
pub fn verify_login(pool: &DbPool, email: &str, password: &str) -> Result<User, AccountError> {
    let conn = pool.get()?;

    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![email],
            map_user,
        )
        .optional()?
        .ok_or(AccountError::InvalidCredentials)?;

    if !verify(password, &user.password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }

    Ok(user)
}
