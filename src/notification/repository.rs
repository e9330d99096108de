use rusqlite::{params, Row};

use super::NotificationError;
use crate::db::models::{Notification, Post};
use crate::state::DbPool;

const NOTIFICATION_COLUMNS: &str =
    "id, user_name, actor_name, post_id, kind, content, is_read, created_at";

fn map_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: row.get(0)?,
        user_name: row.get(1)?,
        actor_name: row.get(2)?,
        post_id: row.get(3)?,
        kind: row.get(4)?,
        content: row.get(5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Tell a post's author that someone liked their post. Liking your own
/// post stays quiet.
pub fn notify_like(pool: &DbPool, post: &Post, actor: &str) -> Result<(), NotificationError> {
    if actor == post.author {
        return Ok(());
    }

    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO notifications (id, user_name, actor_name, post_id, kind) VALUES (?1, ?2, ?3, ?4, 'like')",
        params![id, post.author, actor, post.id],
    )?;
    Ok(())
}

pub fn list_for_user(
    pool: &DbPool,
    user_name: &str,
    unread_only: bool,
) -> Result<Vec<Notification>, NotificationError> {
    let conn = pool.get()?;

    let sql = if unread_only {
        format!(
            "SELECT {} FROM notifications WHERE user_name = ?1 AND is_read = 0 ORDER BY rowid DESC",
            NOTIFICATION_COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM notifications WHERE user_name = ?1 ORDER BY rowid DESC",
            NOTIFICATION_COLUMNS
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let notifications = stmt
        .query_map(params![user_name], map_notification)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notifications)
}

pub fn unread_count(pool: &DbPool, user_name: &str) -> Result<i64, NotificationError> {
    let conn = pool.get()?;

    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_name = ?1 AND is_read = 0",
        params![user_name],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn mark_read(pool: &DbPool, id: &str) -> Result<(), NotificationError> {
    let conn = pool.get()?;

    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        params![id],
    )?;
    if updated == 0 {
        return Err(NotificationError::NotFound);
    }
    Ok(())
}

pub fn mark_all_read(pool: &DbPool, user_name: &str) -> Result<usize, NotificationError> {
    let conn = pool.get()?;

    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE user_name = ?1 AND is_read = 0",
        params![user_name],
    )?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community;
    use crate::post::{self, repository::NewPost};
    use r2d2_sqlite::SqliteConnectionManager;

    fn test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder().max_size(1).build(manager).unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        drop(conn);
        crate::db::run_migrations(&pool).unwrap();
        pool
    }

    fn seeded_post(pool: &DbPool) -> Post {
        let community = community::repository::create(pool, "Trail Runners", "").unwrap();
        community::repository::join(pool, &community.id, "maya").unwrap();
        post::repository::create(
            pool,
            &community.id,
            NewPost {
                author: "maya".to_string(),
                content: "Long run done".to_string(),
                image: None,
                date: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn like_notifies_the_author() {
        let pool = test_pool();
        let post = seeded_post(&pool);

        notify_like(&pool, &post, "carlos").unwrap();

        let inbox = list_for_user(&pool, "maya", false).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].actor_name, "carlos");
        assert_eq!(inbox[0].kind, "like");
        assert!(!inbox[0].is_read);
    }

    #[test]
    fn liking_your_own_post_stays_quiet() {
        let pool = test_pool();
        let post = seeded_post(&pool);

        notify_like(&pool, &post, "maya").unwrap();
        assert!(list_for_user(&pool, "maya", false).unwrap().is_empty());
    }

    #[test]
    fn unread_count_tracks_mark_read() {
        let pool = test_pool();
        let post = seeded_post(&pool);

        notify_like(&pool, &post, "carlos").unwrap();
        notify_like(&pool, &post, "aisha").unwrap();
        assert_eq!(unread_count(&pool, "maya").unwrap(), 2);

        let inbox = list_for_user(&pool, "maya", true).unwrap();
        mark_read(&pool, &inbox[0].id).unwrap();
        assert_eq!(unread_count(&pool, "maya").unwrap(), 1);
        assert_eq!(list_for_user(&pool, "maya", true).unwrap().len(), 1);
    }

    #[test]
    fn mark_all_read_clears_the_counter() {
        let pool = test_pool();
        let post = seeded_post(&pool);

        notify_like(&pool, &post, "carlos").unwrap();
        notify_like(&pool, &post, "aisha").unwrap();

        let updated = mark_all_read(&pool, "maya").unwrap();
        assert_eq!(updated, 2);
        assert_eq!(unread_count(&pool, "maya").unwrap(), 0);
    }

    #[test]
    fn mark_read_missing_notification_is_not_found() {
        let pool = test_pool();
        let result = mark_read(&pool, "nope");
        assert!(matches!(result, Err(NotificationError::NotFound)));
    }

    #[test]
    fn newest_notifications_come_first() {
        let pool = test_pool();
        let post = seeded_post(&pool);

        notify_like(&pool, &post, "carlos").unwrap();
        notify_like(&pool, &post, "aisha").unwrap();

        let inbox = list_for_user(&pool, "maya", false).unwrap();
        assert_eq!(inbox[0].actor_name, "aisha");
        assert_eq!(inbox[1].actor_name, "carlos");
    }
}
