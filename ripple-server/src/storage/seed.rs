use ripple_types::{NewFollow, NewPost, NewUser, UserUpdate};
use tracing::info;

use super::{Storage, StorageResult};

/// Populate an empty store with a small demo network. Safe to call on
/// every startup: a store that already has the first demo user is left
/// untouched. All rows go through the [`Storage`] trait so the counters
/// stay consistent with the relationship rows.
pub fn seed_demo_data(storage: &dyn Storage) -> StorageResult<()> {
    if storage.get_user_by_username("ahmet_yilmaz")?.is_some() {
        info!("demo data already present, skipping seed");
        return Ok(());
    }

    let ahmet = storage.create_user(NewUser {
        username: "ahmet_yilmaz".into(),
        name: "Ahmet Yılmaz".into(),
        bio: Some("Software developer. Coffee enthusiast.".into()),
        avatar: Some("https://i.pravatar.cc/150?img=12".into()),
        is_verified: false,
    })?;
    let elif = storage.create_user(NewUser {
        username: "elif_demir".into(),
        name: "Elif Demir".into(),
        bio: Some("Designer and illustrator.".into()),
        avatar: Some("https://i.pravatar.cc/150?img=45".into()),
        is_verified: true,
    })?;
    let baris = storage.create_user(NewUser {
        username: "baris_ozkan".into(),
        name: "Barış Özkan".into(),
        bio: Some("Travel blogger. 34 countries and counting.".into()),
        avatar: Some("https://i.pravatar.cc/150?img=33".into()),
        is_verified: false,
    })?;
    let selin = storage.create_user(NewUser {
        username: "selin_celik".into(),
        name: "Selin Çelik".into(),
        bio: Some("Street photographer based in Istanbul.".into()),
        avatar: Some("https://i.pravatar.cc/150?img=25".into()),
        is_verified: true,
    })?;

    storage.create_post(NewPost {
        author_id: elif.id,
        content: "Finished a new illustration series today. Posting the first piece tomorrow!"
            .into(),
        image_url: None,
    })?;
    storage.create_post(NewPost {
        author_id: baris.id,
        content: "Country number 34: Portugal. Lisbon's light is unreal.".into(),
        image_url: Some("https://picsum.photos/seed/lisbon/800/500".into()),
    })?;
    storage.create_post(NewPost {
        author_id: selin.id,
        content: "Early morning at the fish market. Best hour for candid shots.".into(),
        image_url: Some("https://picsum.photos/seed/market/800/500".into()),
    })?;

    storage.follow_user(NewFollow {
        follower_id: ahmet.id,
        following_id: elif.id,
    })?;
    storage.follow_user(NewFollow {
        follower_id: ahmet.id,
        following_id: baris.id,
    })?;
    storage.follow_user(NewFollow {
        follower_id: elif.id,
        following_id: selin.id,
    })?;

    // keep a verified flag flip on record so update_user stays exercised
    storage.update_user(
        ahmet.id,
        UserUpdate {
            bio: Some("Software developer. Coffee enthusiast. Building Ripple.".into()),
            ..Default::default()
        },
    )?;

    info!("seeded demo data: 4 users, 3 posts, 3 follows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemStorage, SqliteStorage};

    #[test]
    fn seed_is_idempotent() {
        let storage = MemStorage::new();
        seed_demo_data(&storage).unwrap();
        seed_demo_data(&storage).unwrap();

        let ahmet = storage
            .get_user_by_username("ahmet_yilmaz")
            .unwrap()
            .unwrap();
        assert_eq!(ahmet.following_count, 2);
        assert_eq!(storage.get_following(ahmet.id).unwrap().len(), 2);
    }

    #[test]
    fn seeded_counters_match_rows() {
        let storage = SqliteStorage::in_memory().unwrap();
        seed_demo_data(&storage).unwrap();

        let elif = storage.get_user_by_username("elif_demir").unwrap().unwrap();
        assert_eq!(elif.posts_count, 1);
        assert_eq!(elif.followers_count, 1);
        assert_eq!(elif.following_count, 1);

        let feed = storage.get_feed_posts(elif.id, 20, 0).unwrap();
        // own post plus selin's
        assert_eq!(feed.len(), 2);
    }
}
