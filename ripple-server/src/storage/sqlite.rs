use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};

use ripple_types::{
    Comment, CommentWithAuthor, Follow, Like, NewComment, NewFollow, NewLike, NewPost, NewUser,
    Post, PostWithAuthor, PostWithDetails, User, UserUpdate,
};

use super::schema::SCHEMA;
use super::{Storage, StorageError, StorageResult};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;

const USER_COLUMNS: &str =
    "id, username, name, bio, avatar, followers_count, following_count, posts_count, \
     is_verified, created_at";
const USER_COLUMNS_U: &str =
    "u.id, u.username, u.name, u.bio, u.avatar, u.followers_count, u.following_count, \
     u.posts_count, u.is_verified, u.created_at";
const POST_COLUMNS: &str =
    "id, author_id, content, image_url, likes_count, comments_count, shares_count, created_at";

/// Timestamps are stored as fixed-width RFC3339 text so lexicographic
/// ordering in SQL matches chronological ordering.
fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        bio: row.get(3)?,
        avatar: row.get(4)?,
        followers_count: row.get(5)?,
        following_count: row.get(6)?,
        posts_count: row.get(7)?,
        is_verified: row.get::<_, i64>(8)? != 0,
        created_at: row.get::<_, String>(9)?.parse::<DateTime<Utc>>().unwrap(),
    })
}

fn post_from_row(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        author_id: row.get(1)?,
        content: row.get(2)?,
        image_url: row.get(3)?,
        likes_count: row.get(4)?,
        comments_count: row.get(5)?,
        shares_count: row.get(6)?,
        created_at: row.get::<_, String>(7)?.parse::<DateTime<Utc>>().unwrap(),
    })
}

fn load_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
        [id],
        user_from_row,
    )
    .optional()
}

fn load_post(conn: &Connection, id: i64) -> rusqlite::Result<Option<Post>> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"),
        [id],
        post_from_row,
    )
    .optional()
}

fn liked(conn: &Connection, user_id: i64, post_id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?)",
        params![user_id, post_id],
        |row| row.get(0),
    )
}

fn user_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
        [id],
        |row| row.get(0),
    )
}

/// Relational backend over a pooled rusqlite connection.
///
/// Every paired "row mutation + counter adjustment" runs inside one
/// transaction, so a crash cannot leave a counter out of sync with its
/// backing rows.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: DbPool,
}

impl SqliteStorage {
    /// Create a new storage over a connection pool for `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let manager = if path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH) {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        };
        let manager =
            manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        // An in-memory SQLite database exists per connection; a pool of
        // one keeps every handle on the same database.
        let builder = if path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH) {
            Pool::builder().max_size(1)
        } else {
            Pool::builder()
        };
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;

        let storage = Self { pool };
        storage.initialize()?;
        Ok(storage)
    }

    /// Create an in-memory database (used by tests and demos).
    pub fn in_memory() -> anyhow::Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema. Safe to run multiple times.
    fn initialize(&self) -> anyhow::Result<()> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    fn assemble(
        conn: &Connection,
        post: Post,
        viewer: Option<i64>,
    ) -> StorageResult<Option<PostWithAuthor>> {
        let Some(author) = load_user(conn, post.author_id)? else {
            return Ok(None);
        };
        let is_liked = match viewer {
            Some(v) => liked(conn, v, post.id)?,
            None => false,
        };
        Ok(Some(PostWithAuthor {
            post,
            author,
            is_liked,
        }))
    }
}

impl Storage for SqliteStorage {
    fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let conn = self.pool.get()?;
        Ok(load_user(&conn, id)?)
    }

    fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let conn = self.pool.get()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO users (username, name, bio, avatar, is_verified, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                user.username,
                user.name,
                user.bio,
                user.avatar,
                user.is_verified as i64,
                ts(created_at),
            ],
        )?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: user.username,
            name: user.name,
            bio: user.bio,
            avatar: user.avatar,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            is_verified: user.is_verified,
            created_at,
        })
    }

    fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>> {
        let conn = self.pool.get()?;
        let Some(mut user) = load_user(&conn, id)? else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(bio) = update.bio {
            user.bio = Some(bio);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(is_verified) = update.is_verified {
            user.is_verified = is_verified;
        }
        conn.execute(
            "UPDATE users SET name = ?, bio = ?, avatar = ?, is_verified = ? WHERE id = ?",
            params![user.name, user.bio, user.avatar, user.is_verified as i64, id],
        )?;
        Ok(Some(user))
    }

    fn search_users(&self, query: &str) -> StorageResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE LOWER(name) LIKE '%' || LOWER(?1) || '%'
                OR LOWER(username) LIKE '%' || LOWER(?1) || '%'
             ORDER BY id
             LIMIT 10"
        ))?;
        let users = stmt
            .query_map([query], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get_post(&self, id: i64) -> StorageResult<Option<Post>> {
        let conn = self.pool.get()?;
        Ok(load_post(&conn, id)?)
    }

    fn get_post_with_author(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Option<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let Some(post) = load_post(&conn, id)? else {
            return Ok(None);
        };
        Self::assemble(&conn, post, viewer)
    }

    fn get_post_with_details(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Option<PostWithDetails>> {
        let Some(post) = self.get_post_with_author(id, viewer)? else {
            return Ok(None);
        };
        let comments = self.get_post_comments(id)?;
        Ok(Some(PostWithDetails { post, comments }))
    }

    fn create_post(&self, post: NewPost) -> StorageResult<Post> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        if !user_exists(&tx, post.author_id)? {
            return Err(StorageError::NotFound("User"));
        }
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO posts (author_id, content, image_url, created_at)
             VALUES (?, ?, ?, ?)",
            params![post.author_id, post.content, post.image_url, ts(created_at)],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE users SET posts_count = posts_count + 1 WHERE id = ?",
            [post.author_id],
        )?;
        tx.commit()?;
        Ok(Post {
            id,
            author_id: post.author_id,
            content: post.content,
            image_url: post.image_url,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            created_at,
        })
    }

    fn delete_post(&self, id: i64, owner_id: i64) -> StorageResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let author: Option<i64> = tx
            .query_row("SELECT author_id FROM posts WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?;
        match author {
            Some(author_id) if author_id == owner_id => {}
            _ => return Ok(false),
        }
        // likes and comments cascade with the post row
        tx.execute("DELETE FROM posts WHERE id = ?", [id])?;
        tx.execute(
            "UPDATE users SET posts_count = MAX(posts_count - 1, 0) WHERE id = ?",
            [owner_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn get_feed_posts(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ?1
                OR author_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let posts = stmt
            .query_map(
                params![user_id, limit as i64, offset as i64],
                post_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut feed = Vec::with_capacity(posts.len());
        for post in posts {
            if let Some(view) = Self::assemble(&conn, post, Some(user_id))? {
                feed.push(view);
            }
        }
        Ok(feed)
    }

    fn get_user_posts(
        &self,
        user_id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Vec<PostWithAuthor>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE author_id = ?
             ORDER BY created_at DESC, id DESC"
        ))?;
        let posts = stmt
            .query_map([user_id], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            if let Some(view) = Self::assemble(&conn, post, viewer)? {
                views.push(view);
            }
        }
        Ok(views)
    }

    fn like_post(&self, like: NewLike) -> StorageResult<Like> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        if !user_exists(&tx, like.user_id)? {
            return Err(StorageError::NotFound("User"));
        }
        if load_post(&tx, like.post_id)?.is_none() {
            return Err(StorageError::NotFound("Post"));
        }
        if liked(&tx, like.user_id, like.post_id)? {
            return Err(StorageError::AlreadyLiked);
        }
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
            params![like.user_id, like.post_id, ts(created_at)],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE posts SET likes_count = likes_count + 1 WHERE id = ?",
            [like.post_id],
        )?;
        tx.commit()?;
        Ok(Like {
            id,
            user_id: like.user_id,
            post_id: like.post_id,
            created_at,
        })
    }

    fn unlike_post(&self, user_id: i64, post_id: i64) -> StorageResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
            params![user_id, post_id],
        )?;
        if removed == 0 {
            return Ok(false);
        }
        tx.execute(
            "UPDATE posts SET likes_count = MAX(likes_count - 1, 0) WHERE id = ?",
            [post_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn is_post_liked(&self, user_id: i64, post_id: i64) -> StorageResult<bool> {
        let conn = self.pool.get()?;
        Ok(liked(&conn, user_id, post_id)?)
    }

    fn get_post_comments(&self, post_id: i64) -> StorageResult<Vec<CommentWithAuthor>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT c.id, c.user_id, c.post_id, c.content, c.created_at, {USER_COLUMNS_U}
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.post_id = ?
             ORDER BY c.created_at ASC, c.id ASC"
        ))?;
        let comments = stmt
            .query_map([post_id], |row| {
                Ok(CommentWithAuthor {
                    comment: Comment {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        post_id: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get::<_, String>(4)?.parse::<DateTime<Utc>>().unwrap(),
                    },
                    author: User {
                        id: row.get(5)?,
                        username: row.get(6)?,
                        name: row.get(7)?,
                        bio: row.get(8)?,
                        avatar: row.get(9)?,
                        followers_count: row.get(10)?,
                        following_count: row.get(11)?,
                        posts_count: row.get(12)?,
                        is_verified: row.get::<_, i64>(13)? != 0,
                        created_at: row.get::<_, String>(14)?.parse::<DateTime<Utc>>().unwrap(),
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn create_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        if !user_exists(&tx, comment.user_id)? {
            return Err(StorageError::NotFound("User"));
        }
        if load_post(&tx, comment.post_id)?.is_none() {
            return Err(StorageError::NotFound("Post"));
        }
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO comments (user_id, post_id, content, created_at)
             VALUES (?, ?, ?, ?)",
            params![
                comment.user_id,
                comment.post_id,
                comment.content,
                ts(created_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE posts SET comments_count = comments_count + 1 WHERE id = ?",
            [comment.post_id],
        )?;
        tx.commit()?;
        Ok(Comment {
            id,
            user_id: comment.user_id,
            post_id: comment.post_id,
            content: comment.content,
            created_at,
        })
    }

    fn delete_comment(&self, id: i64, owner_id: i64) -> StorageResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let row: Option<(i64, i64)> = tx
            .query_row(
                "SELECT user_id, post_id FROM comments WHERE id = ?",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let post_id = match row {
            Some((user_id, post_id)) if user_id == owner_id => post_id,
            _ => return Ok(false),
        };
        tx.execute("DELETE FROM comments WHERE id = ?", [id])?;
        tx.execute(
            "UPDATE posts SET comments_count = MAX(comments_count - 1, 0) WHERE id = ?",
            [post_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn follow_user(&self, follow: NewFollow) -> StorageResult<Follow> {
        if follow.follower_id == follow.following_id {
            return Err(StorageError::SelfFollow);
        }
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        if !user_exists(&tx, follow.follower_id)? || !user_exists(&tx, follow.following_id)? {
            return Err(StorageError::NotFound("User"));
        }
        let already: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
            params![follow.follower_id, follow.following_id],
            |row| row.get(0),
        )?;
        if already {
            return Err(StorageError::AlreadyFollowing);
        }
        let created_at = Utc::now();
        tx.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            params![follow.follower_id, follow.following_id, ts(created_at)],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "UPDATE users SET following_count = following_count + 1 WHERE id = ?",
            [follow.follower_id],
        )?;
        tx.execute(
            "UPDATE users SET followers_count = followers_count + 1 WHERE id = ?",
            [follow.following_id],
        )?;
        tx.commit()?;
        Ok(Follow {
            id,
            follower_id: follow.follower_id,
            following_id: follow.following_id,
            created_at,
        })
    }

    fn unfollow_user(&self, follower_id: i64, following_id: i64) -> StorageResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM follows WHERE follower_id = ? AND following_id = ?",
            params![follower_id, following_id],
        )?;
        if removed == 0 {
            return Ok(false);
        }
        tx.execute(
            "UPDATE users SET following_count = MAX(following_count - 1, 0) WHERE id = ?",
            [follower_id],
        )?;
        tx.execute(
            "UPDATE users SET followers_count = MAX(followers_count - 1, 0) WHERE id = ?",
            [following_id],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn is_following(&self, follower_id: i64, following_id: i64) -> StorageResult<bool> {
        let conn = self.pool.get()?;
        let following: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
            params![follower_id, following_id],
            |row| row.get(0),
        )?;
        Ok(following)
    }

    fn get_followers(&self, user_id: i64) -> StorageResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS_U} FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = ?
             ORDER BY f.created_at DESC, f.id DESC"
        ))?;
        let users = stmt
            .query_map([user_id], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get_following(&self, user_id: i64) -> StorageResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS_U} FROM follows f
             JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = ?
             ORDER BY f.created_at DESC, f.id DESC"
        ))?;
        let users = stmt
            .query_map([user_id], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get_suggested_users(&self, user_id: i64, limit: usize) -> StorageResult<Vec<User>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE id != ?1
               AND id NOT IN (SELECT following_id FROM follows WHERE follower_id = ?1)
             ORDER BY followers_count DESC, id ASC
             LIMIT ?2"
        ))?;
        let users = stmt
            .query_map(params![user_id, limit as i64], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::conformance;

    fn test_storage() -> SqliteStorage {
        SqliteStorage::in_memory().expect("Failed to create test database")
    }

    #[test]
    fn schema_creates_all_tables() {
        let storage = test_storage();
        let conn = storage.pool.get().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect tables");

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"posts".to_string()));
        assert!(tables.contains(&"likes".to_string()));
        assert!(tables.contains(&"comments".to_string()));
        assert!(tables.contains(&"follows".to_string()));
    }

    #[test]
    fn initialize_is_idempotent() {
        let storage = test_storage();
        storage.initialize().expect("second initialize failed");
    }

    #[test]
    fn follower_counts_match_follow_rows() {
        conformance::follower_counts_match_follow_rows(&test_storage());
    }

    #[test]
    fn double_like_conflicts_and_counts_once() {
        conformance::double_like_conflicts_and_counts_once(&test_storage());
    }

    #[test]
    fn like_missing_post_is_not_found() {
        conformance::like_missing_post_is_not_found(&test_storage());
    }

    #[test]
    fn unlike_then_relike() {
        conformance::unlike_then_relike(&test_storage());
    }

    #[test]
    fn self_and_duplicate_follow_rejected() {
        conformance::self_and_duplicate_follow_rejected(&test_storage());
    }

    #[test]
    fn unfollow_missing_leaves_counters() {
        conformance::unfollow_missing_leaves_counters(&test_storage());
    }

    #[test]
    fn feed_is_follow_scoped_and_newest_first() {
        conformance::feed_is_follow_scoped_and_newest_first(&test_storage());
    }

    #[test]
    fn suggested_excludes_self_and_followed() {
        conformance::suggested_excludes_self_and_followed(&test_storage());
    }

    #[test]
    fn delete_post_is_author_only_and_decrements() {
        conformance::delete_post_is_author_only_and_decrements(&test_storage());
    }

    #[test]
    fn delete_post_cascades_likes_and_comments() {
        let storage = test_storage();
        let author = storage
            .create_user(NewUser {
                username: "cascade_author".into(),
                name: "Cascade".into(),
                bio: None,
                avatar: None,
                is_verified: false,
            })
            .unwrap();
        let fan = storage
            .create_user(NewUser {
                username: "cascade_fan".into(),
                name: "Fan".into(),
                bio: None,
                avatar: None,
                is_verified: false,
            })
            .unwrap();
        let post = storage
            .create_post(NewPost {
                author_id: author.id,
                content: "short-lived".into(),
                image_url: None,
            })
            .unwrap();
        storage
            .like_post(NewLike { user_id: fan.id, post_id: post.id })
            .unwrap();
        storage
            .create_comment(NewComment {
                user_id: fan.id,
                post_id: post.id,
                content: "gone soon".into(),
            })
            .unwrap();

        assert!(storage.delete_post(post.id, author.id).unwrap());

        let conn = storage.pool.get().unwrap();
        let likes: i64 = conn
            .query_row("SELECT COUNT(*) FROM likes WHERE post_id = ?", [post.id], |r| r.get(0))
            .unwrap();
        let comments: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments WHERE post_id = ?", [post.id], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(likes, 0);
        assert_eq!(comments, 0);
    }

    #[test]
    fn comments_lifecycle() {
        conformance::comments_lifecycle(&test_storage());
    }

    #[test]
    fn post_views_carry_author_and_like_state() {
        conformance::post_views_carry_author_and_like_state(&test_storage());
    }

    #[test]
    fn user_lookup_search_and_update() {
        conformance::user_lookup_search_and_update(&test_storage());
    }

    #[test]
    fn user_posts_are_newest_first() {
        conformance::user_posts_are_newest_first(&test_storage());
    }
}
