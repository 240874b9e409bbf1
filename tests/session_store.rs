use chrono::{Duration, Utc};
use cookie_counter::client::session::{FileSessionStore, SessionStore, StoredSession};

fn stored(token: &str) -> StoredSession {
    StoredSession {
        access_token: token.into(),
        expires_at: Utc::now() + Duration::hours(24),
    }
}

#[tokio::test]
async fn file_store_persists_and_clears() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

    assert!(store.load().await?.is_none());

    store.save(&stored("first")).await?;
    store.save(&stored("second")).await?;
    let loaded = store.load().await?.expect("stored session");
    assert_eq!(loaded.access_token, "second");
    assert!(!loaded.is_expired(Utc::now()));

    store.clear().await?;
    assert!(store.load().await?.is_none());
    // Clearing twice is fine.
    store.clear().await?;

    Ok(())
}

#[tokio::test]
async fn corrupt_file_is_an_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"not json")?;

    let store = FileSessionStore::new(&path);
    assert!(store.load().await.is_err());
    Ok(())
}
