use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use tutorlink::{
    domain::{CreateUserRequest, UserRole},
    repository::{SqliteUserRepository, UserRepository},
};

async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[tokio::test]
async fn test_create_if_absent_is_idempotent() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    let request = CreateUserRequest {
        email: "jane@example.com".to_string(),
        name: "Jane Doe".to_string(),
        role: UserRole::Student,
    };

    let (user, created) = repo.create_if_absent(request.clone()).await?;
    assert!(created);
    assert_eq!(user.email, "jane@example.com");
    assert_eq!(user.role, UserRole::Student);

    // Second call signals already-exists and changes nothing
    let (existing, created_again) = repo.create_if_absent(request).await?;
    assert!(!created_again);
    assert_eq!(existing.id, user.id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("jane@example.com")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn test_search_matches_case_insensitively() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    for (email, name) in [
        ("foo.bar@example.com", "Somebody Else"),
        ("other@example.com", "Mr FOOBAR"),
        ("unrelated@example.com", "Plain Person"),
    ] {
        repo.create_if_absent(CreateUserRequest {
            email: email.to_string(),
            name: name.to_string(),
            role: UserRole::Tutor,
        })
        .await?;
    }

    let results = repo.search(Some("foo"), 5).await?;
    assert_eq!(results.len(), 2);
    assert!(results
        .iter()
        .all(|u| u.email.to_lowercase().contains("foo") || u.name.to_lowercase().contains("foo")));

    let none = repo.search(Some("zzz"), 5).await?;
    assert!(none.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_search_caps_at_limit() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    for i in 0..8 {
        repo.create_if_absent(CreateUserRequest {
            email: format!("user{}@example.com", i),
            name: format!("User {}", i),
            role: UserRole::Student,
        })
        .await?;
    }

    let results = repo.search(None, 5).await?;
    assert_eq!(results.len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_update_role_and_delete() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteUserRepository::new(pool.clone());

    let (user, _) = repo
        .create_if_absent(CreateUserRequest {
            email: "promote@example.com".to_string(),
            name: "Promote Me".to_string(),
            role: UserRole::Student,
        })
        .await?;

    let updated = repo.update_role(user.id, UserRole::Admin).await?;
    assert_eq!(updated.role, UserRole::Admin);

    repo.delete(user.id).await?;
    assert!(repo.find_by_email("promote@example.com").await?.is_none());

    Ok(())
}
