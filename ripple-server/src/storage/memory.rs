use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use ripple_types::{
    Comment, CommentWithAuthor, Follow, Like, NewComment, NewFollow, NewLike, NewPost, NewUser,
    Post, PostWithAuthor, PostWithDetails, User, UserUpdate,
};

use super::{Storage, StorageError, StorageResult};

/// In-memory backend: maps keyed by id, linear scans for lookups,
/// per-entity auto-incrementing ids. The lock is held for the whole
/// operation, so each row mutation and its counter adjustment land
/// together.
pub struct MemStorage {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    likes: BTreeMap<i64, Like>,
    comments: BTreeMap<i64, Comment>,
    follows: BTreeMap<i64, Follow>,
    next_user_id: i64,
    next_post_id: i64,
    next_like_id: i64,
    next_comment_id: i64,
    next_follow_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Inner {
    fn post_with_author(&self, post: &Post, viewer: Option<i64>) -> Option<PostWithAuthor> {
        let author = self.users.get(&post.author_id)?.clone();
        let is_liked = viewer
            .map(|v| self.like_of(v, post.id).is_some())
            .unwrap_or(false);
        Some(PostWithAuthor {
            post: post.clone(),
            author,
            is_liked,
        })
    }

    fn like_of(&self, user_id: i64, post_id: i64) -> Option<i64> {
        self.likes
            .values()
            .find(|l| l.user_id == user_id && l.post_id == post_id)
            .map(|l| l.id)
    }

    fn follow_of(&self, follower_id: i64, following_id: i64) -> Option<i64> {
        self.follows
            .values()
            .find(|f| f.follower_id == follower_id && f.following_id == following_id)
            .map(|f| f.id)
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemStorage {
    fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }

    fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut inner = self.inner.lock().unwrap();
        let id = next_id(&mut inner.next_user_id);
        let user = User {
            id,
            username: user.username,
            name: user.name,
            bio: user.bio,
            avatar: user.avatar,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            is_verified: user.is_verified,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
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
        Ok(Some(user.clone()))
    }

    fn search_users(&self, query: &str) -> StorageResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let term = query.to_lowercase();
        Ok(inner
            .users
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&term) || u.username.to_lowercase().contains(&term)
            })
            .take(10)
            .cloned()
            .collect())
    }

    fn get_post(&self, id: i64) -> StorageResult<Option<Post>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts.get(&id).cloned())
    }

    fn get_post_with_author(
        &self,
        id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Option<PostWithAuthor>> {
        let inner = self.inner.lock().unwrap();
        let Some(post) = inner.posts.get(&id) else {
            return Ok(None);
        };
        Ok(inner.post_with_author(post, viewer))
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
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&post.author_id) {
            return Err(StorageError::NotFound("User"));
        }
        let id = next_id(&mut inner.next_post_id);
        let row = Post {
            id,
            author_id: post.author_id,
            content: post.content,
            image_url: post.image_url,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            created_at: Utc::now(),
        };
        inner.posts.insert(id, row.clone());
        if let Some(author) = inner.users.get_mut(&post.author_id) {
            author.posts_count += 1;
        }
        Ok(row)
    }

    fn delete_post(&self, id: i64, owner_id: i64) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.posts.get(&id) {
            Some(post) if post.author_id == owner_id => {}
            _ => return Ok(false),
        }
        inner.posts.remove(&id);
        inner.likes.retain(|_, l| l.post_id != id);
        inner.comments.retain(|_, c| c.post_id != id);
        if let Some(author) = inner.users.get_mut(&owner_id) {
            author.posts_count = (author.posts_count - 1).max(0);
        }
        Ok(true)
    }

    fn get_feed_posts(
        &self,
        user_id: i64,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<PostWithAuthor>> {
        let inner = self.inner.lock().unwrap();
        let mut author_ids: HashSet<i64> = inner
            .follows
            .values()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id)
            .collect();
        author_ids.insert(user_id);

        let mut posts: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| author_ids.contains(&p.author_id))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(offset)
            .take(limit)
            .filter_map(|p| inner.post_with_author(p, Some(user_id)))
            .collect())
    }

    fn get_user_posts(
        &self,
        user_id: i64,
        viewer: Option<i64>,
    ) -> StorageResult<Vec<PostWithAuthor>> {
        let inner = self.inner.lock().unwrap();
        let mut posts: Vec<&Post> = inner
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .filter_map(|p| inner.post_with_author(p, viewer))
            .collect())
    }

    fn like_post(&self, like: NewLike) -> StorageResult<Like> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&like.user_id) {
            return Err(StorageError::NotFound("User"));
        }
        if !inner.posts.contains_key(&like.post_id) {
            return Err(StorageError::NotFound("Post"));
        }
        if inner.like_of(like.user_id, like.post_id).is_some() {
            return Err(StorageError::AlreadyLiked);
        }
        let id = next_id(&mut inner.next_like_id);
        let row = Like {
            id,
            user_id: like.user_id,
            post_id: like.post_id,
            created_at: Utc::now(),
        };
        inner.likes.insert(id, row.clone());
        if let Some(post) = inner.posts.get_mut(&like.post_id) {
            post.likes_count += 1;
        }
        Ok(row)
    }

    fn unlike_post(&self, user_id: i64, post_id: i64) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(like_id) = inner.like_of(user_id, post_id) else {
            return Ok(false);
        };
        inner.likes.remove(&like_id);
        if let Some(post) = inner.posts.get_mut(&post_id) {
            post.likes_count = (post.likes_count - 1).max(0);
        }
        Ok(true)
    }

    fn is_post_liked(&self, user_id: i64, post_id: i64) -> StorageResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.like_of(user_id, post_id).is_some())
    }

    fn get_post_comments(&self, post_id: i64) -> StorageResult<Vec<CommentWithAuthor>> {
        let inner = self.inner.lock().unwrap();
        let mut comments: Vec<&Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                inner.users.get(&c.user_id).map(|author| CommentWithAuthor {
                    comment: c.clone(),
                    author: author.clone(),
                })
            })
            .collect())
    }

    fn create_comment(&self, comment: NewComment) -> StorageResult<Comment> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.users.contains_key(&comment.user_id) {
            return Err(StorageError::NotFound("User"));
        }
        if !inner.posts.contains_key(&comment.post_id) {
            return Err(StorageError::NotFound("Post"));
        }
        let id = next_id(&mut inner.next_comment_id);
        let row = Comment {
            id,
            user_id: comment.user_id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        inner.comments.insert(id, row.clone());
        if let Some(post) = inner.posts.get_mut(&comment.post_id) {
            post.comments_count += 1;
        }
        Ok(row)
    }

    fn delete_comment(&self, id: i64, owner_id: i64) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let post_id = match inner.comments.get(&id) {
            Some(comment) if comment.user_id == owner_id => comment.post_id,
            _ => return Ok(false),
        };
        inner.comments.remove(&id);
        if let Some(post) = inner.posts.get_mut(&post_id) {
            post.comments_count = (post.comments_count - 1).max(0);
        }
        Ok(true)
    }

    fn follow_user(&self, follow: NewFollow) -> StorageResult<Follow> {
        let mut inner = self.inner.lock().unwrap();
        if follow.follower_id == follow.following_id {
            return Err(StorageError::SelfFollow);
        }
        if !inner.users.contains_key(&follow.follower_id)
            || !inner.users.contains_key(&follow.following_id)
        {
            return Err(StorageError::NotFound("User"));
        }
        if inner.follow_of(follow.follower_id, follow.following_id).is_some() {
            return Err(StorageError::AlreadyFollowing);
        }
        let id = next_id(&mut inner.next_follow_id);
        let row = Follow {
            id,
            follower_id: follow.follower_id,
            following_id: follow.following_id,
            created_at: Utc::now(),
        };
        inner.follows.insert(id, row.clone());
        if let Some(follower) = inner.users.get_mut(&follow.follower_id) {
            follower.following_count += 1;
        }
        if let Some(following) = inner.users.get_mut(&follow.following_id) {
            following.followers_count += 1;
        }
        Ok(row)
    }

    fn unfollow_user(&self, follower_id: i64, following_id: i64) -> StorageResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        let Some(follow_id) = inner.follow_of(follower_id, following_id) else {
            return Ok(false);
        };
        inner.follows.remove(&follow_id);
        if let Some(follower) = inner.users.get_mut(&follower_id) {
            follower.following_count = (follower.following_count - 1).max(0);
        }
        if let Some(following) = inner.users.get_mut(&following_id) {
            following.followers_count = (following.followers_count - 1).max(0);
        }
        Ok(true)
    }

    fn is_following(&self, follower_id: i64, following_id: i64) -> StorageResult<bool> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.follow_of(follower_id, following_id).is_some())
    }

    fn get_followers(&self, user_id: i64) -> StorageResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let mut follows: Vec<&Follow> = inner
            .follows
            .values()
            .filter(|f| f.following_id == user_id)
            .collect();
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(follows
            .into_iter()
            .filter_map(|f| inner.users.get(&f.follower_id).cloned())
            .collect())
    }

    fn get_following(&self, user_id: i64) -> StorageResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let mut follows: Vec<&Follow> = inner
            .follows
            .values()
            .filter(|f| f.follower_id == user_id)
            .collect();
        follows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(follows
            .into_iter()
            .filter_map(|f| inner.users.get(&f.following_id).cloned())
            .collect())
    }

    fn get_suggested_users(&self, user_id: i64, limit: usize) -> StorageResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let mut excluded: HashSet<i64> = inner
            .follows
            .values()
            .filter(|f| f.follower_id == user_id)
            .map(|f| f.following_id)
            .collect();
        excluded.insert(user_id);

        let mut users: Vec<&User> = inner
            .users
            .values()
            .filter(|u| !excluded.contains(&u.id))
            .collect();
        users.sort_by(|a, b| b.followers_count.cmp(&a.followers_count).then(a.id.cmp(&b.id)));
        Ok(users.into_iter().take(limit).cloned().collect())
    }
}
