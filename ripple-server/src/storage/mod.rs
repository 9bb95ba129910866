pub mod memory;
pub mod schema;
pub mod seed;
pub mod sqlite;

pub use memory::MemStorage;
pub use sqlite::SqliteStorage;

use ripple_types::{
    Comment, CommentWithAuthor, Follow, Like, NewComment, NewFollow, NewLike, NewPost, NewUser,
    Post, PostWithAuthor, PostWithDetails, User, UserUpdate,
};

/// Domain errors surfaced by both storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Post already liked")]
    AlreadyLiked,

    #[error("Already following user")]
    AlreadyFollowing,

    #[error("Cannot follow yourself")]
    SelfFollow,

    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.into())
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::Backend(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Contract between the route layer and the data store.
///
/// Two backends implement it: [`MemStorage`] (maps behind a lock) and
/// [`SqliteStorage`] (pooled rusqlite). They must be indistinguishable
/// through this interface; the conformance suite below runs every
/// observable property against both.
///
/// Denormalized counters (`likes_count`, `comments_count`,
/// `followers_count`, `following_count`, `posts_count`) are adjusted
/// together with the row mutation as one atomic step and are never
/// recomputed on read. Decrements floor at zero.
pub trait Storage: Send + Sync {
    // Users
    fn get_user(&self, id: i64) -> StorageResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    fn create_user(&self, user: NewUser) -> StorageResult<User>;
    fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>>;
    /// Case-insensitive substring match on name or username, capped at 10.
    fn search_users(&self, query: &str) -> StorageResult<Vec<User>>;

    // Posts
    fn get_post(&self, id: i64) -> StorageResult<Option<Post>>;
    fn get_post_with_author(&self, id: i64, viewer: Option<i64>)
        -> StorageResult<Option<PostWithAuthor>>;
    fn get_post_with_details(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Option<PostWithDetails>>;
    fn create_post(&self, post: NewPost) -> StorageResult<Post>;
    /// Author-only delete. Returns false when the post is missing or
    /// owned by someone else, without distinguishing the two.
    fn delete_post(&self, id: i64, owner_id: i64) -> StorageResult<bool>;
    /// Posts authored by `user_id` or anyone they follow, newest first,
    /// sliced by offset/limit after the filter.
    fn get_feed_posts(&self, user_id: i64, limit: usize, offset: usize)
        -> StorageResult<Vec<PostWithAuthor>>;
    fn get_user_posts(&self, user_id: i64, viewer: Option<i64>)
        -> StorageResult<Vec<PostWithAuthor>>;

    // Likes
    fn like_post(&self, like: NewLike) -> StorageResult<Like>;
    fn unlike_post(&self, user_id: i64, post_id: i64) -> StorageResult<bool>;
    fn is_post_liked(&self, user_id: i64, post_id: i64) -> StorageResult<bool>;

    // Comments
    /// Comments on a post, oldest first.
    fn get_post_comments(&self, post_id: i64) -> StorageResult<Vec<CommentWithAuthor>>;
    fn create_comment(&self, comment: NewComment) -> StorageResult<Comment>;
    fn delete_comment(&self, id: i64, owner_id: i64) -> StorageResult<bool>;

    // Follows
    fn follow_user(&self, follow: NewFollow) -> StorageResult<Follow>;
    fn unfollow_user(&self, follower_id: i64, following_id: i64) -> StorageResult<bool>;
    fn is_following(&self, follower_id: i64, following_id: i64) -> StorageResult<bool>;
    fn get_followers(&self, user_id: i64) -> StorageResult<Vec<User>>;
    fn get_following(&self, user_id: i64) -> StorageResult<Vec<User>>;
    /// Users the caller does not follow (and is not), by followers_count
    /// descending, truncated to `limit`.
    fn get_suggested_users(&self, user_id: i64, limit: usize) -> StorageResult<Vec<User>>;
}
