//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, NullOrdering, Order, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use blogify_core::domain::{BlogEntry, Post, Profile};
use blogify_core::error::RepoError;
use blogify_core::ports::{
    BlogFilter, BlogOrder, BlogQuery, BlogRepository, Direction, ProfileRepository, VerifyOutcome,
};

use super::entity::blog::{self, Entity as BlogEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::postgres_base::{PostgresBaseRepository, UpsertPolicy, map_db_err};

/// PostgreSQL blog repository.
pub type PostgresBlogRepository = PostgresBaseRepository<BlogEntity>;

/// PostgreSQL profile repository.
pub type PostgresProfileRepository = PostgresBaseRepository<ProfileEntity>;

/// A save never moves `created_at` and never takes a verified row back to
/// pending.
impl UpsertPolicy for BlogEntity {
    fn immutable_columns() -> Vec<blog::Column> {
        vec![blog::Column::CreatedAt]
    }

    fn merged_columns() -> Vec<(blog::Column, SimpleExpr)> {
        vec![
            (
                blog::Column::Verified,
                Expr::cust(r#""blogs"."verified" OR "excluded"."verified""#),
            ),
            (
                blog::Column::VerifiedAt,
                Expr::cust(r#"COALESCE("blogs"."verified_at", "excluded"."verified_at")"#),
            ),
            (
                blog::Column::VerificationRequested,
                Expr::cust(r#""blogs"."verified" OR "excluded"."verification_requested""#),
            ),
        ]
    }
}

impl UpsertPolicy for ProfileEntity {
    fn immutable_columns() -> Vec<profile::Column> {
        vec![profile::Column::CreatedAt]
    }
}

fn condition(filter: BlogFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(published) = filter.published {
        condition = condition.add(blog::Column::Published.eq(published));
    }
    if let Some(verified) = filter.verified {
        condition = condition.add(blog::Column::Verified.eq(verified));
    }
    if let Some(requested) = filter.verification_requested {
        condition = condition.add(blog::Column::VerificationRequested.eq(requested));
    }
    condition
}

fn join_entry(row: (blog::Model, Option<profile::Model>)) -> BlogEntry {
    let (blog, author) = row;
    let post: Post = blog.into();
    let author = author
        .map(Profile::from)
        .unwrap_or_else(|| Profile::placeholder(post.author_id));
    BlogEntry::new(post, author)
}

#[async_trait]
impl BlogRepository for PostgresBlogRepository {
    async fn query(&self, query: BlogQuery) -> Result<Vec<BlogEntry>, RepoError> {
        tracing::debug!(?query, "Querying blogs");

        let mut select = BlogEntity::find().filter(condition(query.filter));

        if let Some((column, direction)) = query.order {
            let column = match column {
                BlogOrder::CreatedAt => blog::Column::CreatedAt,
                BlogOrder::VerifiedAt => blog::Column::VerifiedAt,
            };
            let order = match direction {
                Direction::Ascending => Order::Asc,
                Direction::Descending => Order::Desc,
            };
            select = select.order_by_with_nulls(column, order, NullOrdering::Last);
        }

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        let rows = select
            .find_also_related(ProfileEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(join_entry).collect())
    }

    async fn find_entry(&self, id: Uuid) -> Result<Option<BlogEntry>, RepoError> {
        let row = BlogEntity::find_by_id(id)
            .find_also_related(ProfileEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(row.map(join_entry))
    }

    async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<VerifyOutcome, RepoError> {
        // The guard lives in the WHERE clause so concurrent verifiers cannot
        // both stamp the row.
        let updated = BlogEntity::update_many()
            .col_expr(blog::Column::Verified, Expr::value(true))
            .col_expr(blog::Column::VerifiedAt, Expr::value(at.fixed_offset()))
            .filter(blog::Column::Id.eq(id))
            .filter(blog::Column::VerificationRequested.eq(true))
            .filter(blog::Column::Verified.eq(false))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        let current = BlogEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .map(Post::from);

        let outcome = match current {
            None => VerifyOutcome::NotFound,
            Some(post) if updated.rows_affected > 0 => VerifyOutcome::Verified(post),
            Some(post) if post.verified => VerifyOutcome::AlreadyVerified(post),
            Some(post) => VerifyOutcome::NotRequested(post),
        };

        tracing::debug!(blog_id = %id, rows = updated.rows_affected, "Conditional verify");
        Ok(outcome)
    }

    async fn count(&self, filter: BlogFilter) -> Result<u64, RepoError> {
        BlogEntity::find()
            .filter(condition(filter))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, RepoError> {
        tracing::debug!(username, "Finding profile by username");

        let result = ProfileEntity::find()
            .filter(profile::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        ProfileEntity::find()
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}
