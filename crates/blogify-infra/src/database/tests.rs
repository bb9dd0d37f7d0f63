use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, EntityTrait, MockDatabase, MockExecResult, QueryTrait, Value};
use uuid::Uuid;

use crate::database::entity::{blog, profile};
use crate::database::postgres_base::upsert_clause;
use crate::database::postgres_repo::{PostgresBlogRepository, PostgresProfileRepository};
use blogify_core::domain::{Post, Profile};
use blogify_core::ports::{
    BaseRepository, BlogFilter, BlogQuery, BlogRepository, ProfileRepository, VerifyOutcome,
};

fn blog_model(id: Uuid, author_id: Uuid, requested: bool, verified: bool) -> blog::Model {
    let now = Utc::now();
    blog::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        content: "Content".to_owned(),
        excerpt: None,
        published: true,
        verified,
        verification_requested: requested,
        verified_at: verified.then(|| now.into()),
        created_at: now.into(),
        background_image_url: None,
    }
}

fn profile_model(user_id: Uuid) -> profile::Model {
    profile::Model {
        user_id,
        username: "ada".to_owned(),
        display_name: Some("Ada".to_owned()),
        created_at: Utc::now().into(),
    }
}

fn no_rows() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![blog_model(post_id, Uuid::new_v4(), false, false)]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_save_returns_stored_row() {
    let author = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![profile_model(author)]])
        .into_connection();

    let repo = PostgresProfileRepository::new(db);
    let saved: Profile = repo.save(Profile::new(author, "ada")).await.unwrap();

    assert_eq!(saved.display_name(), "Ada");
}

#[test]
fn test_blog_upsert_keeps_created_at_and_verification() {
    let active: blog::ActiveModel = Post::new(Uuid::new_v4(), "Stale", "Copy").into();
    let sql = blog::Entity::insert(active)
        .on_conflict(upsert_clause::<blog::Entity>())
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#"ON CONFLICT ("id") DO UPDATE SET"#), "{sql}");
    assert!(sql.contains(r#""title" = "excluded"."title""#), "{sql}");
    assert!(!sql.contains(r#""created_at" = "#), "{sql}");
    assert!(sql.contains(r#""blogs"."verified" OR "excluded"."verified""#), "{sql}");
    assert!(
        sql.contains(r#"COALESCE("blogs"."verified_at", "excluded"."verified_at")"#),
        "{sql}"
    );
}

#[test]
fn test_profile_upsert_keeps_created_at() {
    let active: profile::ActiveModel = Profile::new(Uuid::new_v4(), "ada").into();
    let sql = profile::Entity::insert(active)
        .on_conflict(upsert_clause::<profile::Entity>())
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""username" = "excluded"."username""#), "{sql}");
    assert!(!sql.contains(r#""created_at" = "#), "{sql}");
}

#[tokio::test]
async fn test_query_joins_author_and_placeholder() {
    let author = Uuid::new_v4();
    let orphan_author = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            (
                blog_model(Uuid::new_v4(), author, true, false),
                Some(profile_model(author)),
            ),
            (blog_model(Uuid::new_v4(), orphan_author, true, false), None),
        ]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let rows = repo.query(BlogQuery::new(BlogFilter::pending())).await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].author_name(), "Ada");
    assert_eq!(rows[1].author_name(), "unknown");
    assert_eq!(rows[1].author.user_id, orphan_author);
}

#[tokio::test]
async fn test_mark_verified_updates_pending_row() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results(vec![vec![blog_model(id, Uuid::new_v4(), true, true)]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let outcome = repo.mark_verified(id, Utc::now()).await.unwrap();

    assert!(matches!(outcome, VerifyOutcome::Verified(p) if p.verified && p.verified_at.is_some()));
}

#[tokio::test]
async fn test_mark_verified_already_verified() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![no_rows()])
        .append_query_results(vec![vec![blog_model(id, Uuid::new_v4(), true, true)]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let outcome = repo.mark_verified(id, Utc::now()).await.unwrap();

    assert!(matches!(outcome, VerifyOutcome::AlreadyVerified(_)));
}

#[tokio::test]
async fn test_mark_verified_not_requested() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![no_rows()])
        .append_query_results(vec![vec![blog_model(id, Uuid::new_v4(), false, false)]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let outcome = repo.mark_verified(id, Utc::now()).await.unwrap();

    assert!(matches!(outcome, VerifyOutcome::NotRequested(p) if !p.verified));
}

#[tokio::test]
async fn test_mark_verified_missing_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![no_rows()])
        .append_query_results(vec![Vec::<blog::Model>::new()])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let outcome = repo.mark_verified(Uuid::new_v4(), Utc::now()).await.unwrap();

    assert_eq!(outcome, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_count_reads_num_items() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(4)),
        )])]])
        .into_connection();

    let repo = PostgresBlogRepository::new(db);
    let count = repo.count(BlogFilter::verified()).await.unwrap();

    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_find_profile_by_username() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![profile_model(user_id)]])
        .into_connection();

    let repo = PostgresProfileRepository::new(db);
    let profile = repo.find_by_username("ada").await.unwrap().unwrap();

    assert_eq!(profile.user_id, user_id);
}
