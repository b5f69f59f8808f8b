use std::path::Path;

use async_trait::async_trait;
use parley_core::{RecordStore, UserRecord};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryOrder, Schema, Set,
};
use tracing::info;

use crate::entity::users;
use crate::error::StorageError;

/// SQLite-backed store for extracted user records.
pub struct SqliteRecordStore {
    db: DatabaseConnection,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database file at `db_path`.
    pub async fn open(db_path: &Path) -> Result<Self, StorageError> {
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        Self::connect(&db_url).await
    }

    /// Connect to `db_url` and make sure the `users` table exists.
    pub async fn connect(db_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to database: {}", db_url);

        let db = Database::connect(db_url).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(users::Entity);
        stmt.if_not_exists();
        db.execute_unprepared(&backend.build(&stmt).to_string())
            .await?;

        info!("SqliteRecordStore initialized");
        Ok(Self { db })
    }

    /// Every stored record, oldest first.
    pub async fn all(&self) -> Result<Vec<(i64, UserRecord)>, StorageError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| (i64::from(m.id), m.into_record()))
            .collect())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn save(&self, record: &UserRecord) -> anyhow::Result<i64> {
        let model = users::ActiveModel {
            id: NotSet,
            name: Set(record.name.clone()),
            email: Set(record.email.clone()),
            phone: Set(record.phone.clone()),
            location: Set(record.location.clone()),
            age: Set(record.age),
        }
        .insert(&self.db)
        .await
        .map_err(StorageError::from)?;

        info!("Saved user record: {}", model.id);
        Ok(i64::from(model.id))
    }
}
