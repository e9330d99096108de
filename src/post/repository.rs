use chrono::NaiveDate;
use rusqlite::{params, ErrorCode, Row};
use url::Url;

use super::PostError;
use crate::db::models::Post;
use crate::state::DbPool;

const POST_COLUMNS: &str = "id, community_id, author, content, image, date, likes";

fn map_post(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        community_id: row.get(1)?,
        author: row.get(2)?,
        content: row.get(3)?,
        image: row.get(4)?,
        date: row.get(5)?,
        likes: row.get(6)?,
    })
}

/// Fields a client supplies when creating a post. The server owns the
/// id and the like counter; a missing date defaults to today.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author: String,
    pub content: String,
    pub image: Option<String>,
    pub date: Option<String>,
}

pub fn list_for_community(
    pool: &DbPool,
    community_id: &str,
) -> Result<Vec<Post>, PostError> {
    let conn = pool.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM communities WHERE id = ?1",
        params![community_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(PostError::CommunityNotFound);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM posts WHERE community_id = ?1 ORDER BY rowid DESC",
        POST_COLUMNS
    ))?;
    let posts = stmt
        .query_map(params![community_id], map_post)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(posts)
}

pub fn create(
    pool: &DbPool,
    community_id: &str,
    new_post: NewPost,
) -> Result<Post, PostError> {
    if new_post.content.is_empty() {
        return Err(PostError::EmptyContent);
    }

    // Treat an empty image field as no image at all.
    let image = new_post.image.filter(|s| !s.is_empty());
    if let Some(ref image) = image {
        let looks_like_url = image.starts_with('/') || Url::parse(image).is_ok();
        if !looks_like_url {
            return Err(PostError::InvalidImage);
        }
    }

    let date = match new_post.date {
        Some(date) => {
            if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
                return Err(PostError::InvalidDate);
            }
            date
        }
        None => chrono::Local::now().date_naive().to_string(),
    };

    let conn = pool.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM communities WHERE id = ?1",
        params![community_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(PostError::CommunityNotFound);
    }

    let member: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM community_members WHERE community_id = ?1 AND user_name = ?2",
        params![community_id, new_post.author],
        |row| row.get(0),
    )?;
    if !member {
        return Err(PostError::NotMember);
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO posts (id, community_id, author, content, image, date, likes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![id, community_id, new_post.author, new_post.content, image, date],
    )?;

    Ok(Post {
        id,
        community_id: community_id.to_string(),
        author: new_post.author,
        content: new_post.content,
        image,
        date,
        likes: 0,
    })
}

/// Record a like. Each user may like a post once; the counter and the
/// per-user row move together in one transaction.
pub fn like(
    pool: &DbPool,
    community_id: &str,
    post_id: &str,
    user_name: &str,
) -> Result<Post, PostError> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let post = match tx.query_row(
        &format!(
            "SELECT {} FROM posts WHERE id = ?1 AND community_id = ?2",
            POST_COLUMNS
        ),
        params![post_id, community_id],
        map_post,
    ) {
        Ok(post) => post,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(PostError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let inserted = tx.execute(
        "INSERT INTO post_likes (post_id, user_name) VALUES (?1, ?2)",
        params![post_id, user_name],
    );
    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            return Err(PostError::AlreadyLiked);
        }
        Err(e) => return Err(e.into()),
    }

    tx.execute(
        "UPDATE posts SET likes = likes + 1 WHERE id = ?1",
        params![post_id],
    )?;
    let likes: i64 = tx.query_row(
        "SELECT likes FROM posts WHERE id = ?1",
        params![post_id],
        |row| row.get(0),
    )?;
    tx.commit()?;

    Ok(Post { likes, ..post })
}
