use std::collections::HashMap;

use rusqlite::{params, Connection, ErrorCode};

use super::CommunityError;
use crate::db::models::Community;
use crate::state::DbPool;

fn members_of(conn: &Connection, community_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT user_name FROM community_members WHERE community_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![community_id], |row| row.get(0))?;
    rows.collect()
}

/// All communities in creation order, each with its member roster.
pub fn list_all(pool: &DbPool) -> Result<Vec<Community>, CommunityError> {
    let conn = pool.get()?;

    let mut members_by_community: HashMap<String, Vec<String>> = HashMap::new();
    {
        let mut stmt =
            conn.prepare("SELECT community_id, user_name FROM community_members ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (community_id, user_name) = row?;
            members_by_community
                .entry(community_id)
                .or_default()
                .push(user_name);
        }
    }

    let mut stmt =
        conn.prepare("SELECT id, name, description FROM communities ORDER BY rowid")?;
    let communities = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(communities
        .into_iter()
        .map(|(id, name, description)| {
            let members = members_by_community.remove(&id).unwrap_or_default();
            Community {
                id,
                name,
                description,
                members,
            }
        })
        .collect())
}

pub fn find(pool: &DbPool, id: &str) -> Result<Community, CommunityError> {
    let conn = pool.get()?;

    let row = conn.query_row(
        "SELECT id, name, description FROM communities WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    );

    let (id, name, description) = match row {
        Ok(fields) => fields,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(CommunityError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let members = members_of(&conn, &id)?;
    Ok(Community {
        id,
        name,
        description,
        members,
    })
}

pub fn create(
    pool: &DbPool,
    name: &str,
    description: &str,
) -> Result<Community, CommunityError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommunityError::EmptyName);
    }

    let conn = pool.get()?;
    let id = uuid::Uuid::now_v7().to_string();

    conn.execute(
        "INSERT INTO communities (id, name, description) VALUES (?1, ?2, ?3)",
        params![id, name, description],
    )?;

    Ok(Community {
        id,
        name: name.to_string(),
        description: description.to_string(),
        members: Vec::new(),
    })
}

/// Full replace of name and description.
pub fn update(
    pool: &DbPool,
    id: &str,
    name: &str,
    description: &str,
) -> Result<Community, CommunityError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommunityError::EmptyName);
    }

    let conn = pool.get()?;
    let updated = conn.execute(
        "UPDATE communities SET name = ?1, description = ?2 WHERE id = ?3",
        params![name, description, id],
    )?;
    if updated == 0 {
        return Err(CommunityError::NotFound);
    }

    let members = members_of(&conn, id)?;
    Ok(Community {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        members,
    })
}

/// Deletes the community. Posts, likes and membership rows go with it.
pub fn delete(pool: &DbPool, id: &str) -> Result<(), CommunityError> {
    let conn = pool.get()?;

    let deleted = conn.execute("DELETE FROM communities WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(CommunityError::NotFound);
    }
    Ok(())
}

pub fn join(pool: &DbPool, id: &str, user_name: &str) -> Result<(), CommunityError> {
    let conn = pool.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM communities WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(CommunityError::NotFound);
    }

    let result = conn.execute(
        "INSERT INTO community_members (community_id, user_name) VALUES (?1, ?2)",
        params![id, user_name],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            Err(CommunityError::AlreadyMember)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn leave(pool: &DbPool, id: &str, user_name: &str) -> Result<(), CommunityError> {
    let conn = pool.get()?;

    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM communities WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(CommunityError::NotFound);
    }

    let removed = conn.execute(
        "DELETE FROM community_members WHERE community_id = ?1 AND user_name = ?2",
        params![id, user_name],
    )?;
    if removed == 0 {
        return Err(CommunityError::NotMember);
    }
    Ok(())
}

pub fn is_member(pool: &DbPool, id: &str, user_name: &str) -> Result<bool, CommunityError> {
    let conn = pool.get()?;

    let member: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM community_members WHERE community_id = ?1 AND user_name = ?2",
        params![id, user_name],
        |row| row.get(0),
    )?;
    Ok(member)
}
