use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::sea_query::{OnConflict, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, DbConn, DbErr, EntityTrait, IdenStatic, IntoActiveModel, Iterable,
    PrimaryKeyToColumn, PrimaryKeyTrait,
};

use blogify_core::error::RepoError;
use blogify_core::ports::BaseRepository;

/// Generic PostgreSQL repository implementation.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// How a conflicting insert merges into the stored row.
///
/// Columns not named here are overwritten with the incoming value.
pub trait UpsertPolicy: EntityTrait {
    /// Columns kept as stored.
    fn immutable_columns() -> Vec<Self::Column> {
        Vec::new()
    }

    /// Columns set from an expression over the stored and `excluded` rows.
    fn merged_columns() -> Vec<(Self::Column, SimpleExpr)> {
        Vec::new()
    }
}

/// `ON CONFLICT (pk) DO UPDATE` clause for `E`.
pub(crate) fn upsert_clause<E: UpsertPolicy>() -> OnConflict {
    let keys: Vec<E::Column> = E::PrimaryKey::iter().map(|k| k.into_column()).collect();
    let merged = E::merged_columns();
    let kept: Vec<E::Column> = keys
        .iter()
        .copied()
        .chain(E::immutable_columns())
        .chain(merged.iter().map(|(column, _)| *column))
        .collect();
    let updates: Vec<E::Column> = E::Column::iter()
        .filter(|c| kept.iter().all(|k| k.as_str() != c.as_str()))
        .collect();

    let mut on_conflict = OnConflict::columns(keys);
    on_conflict.update_columns(updates).values(merged);
    on_conflict
}

/// Map a SeaORM error, recognising unique/foreign-key violations.
pub(crate) fn map_db_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => {
            let err_str = other.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("Entity already exists".to_string())
            } else if err_str.contains("foreign key") {
                RepoError::Constraint(err_str)
            } else {
                RepoError::Query(err_str)
            }
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: UpsertPolicy,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync + Send,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send + Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + Copy + 'static,
    T: From<E::Model> + Into<E::ActiveModel> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    /// Upsert on the primary key under `E`'s [`UpsertPolicy`], returning the
    /// stored row.
    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let active_model: E::ActiveModel = entity.into();
        let model = E::insert(active_model)
            .on_conflict(upsert_clause::<E>())
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(model.into())
    }
}
