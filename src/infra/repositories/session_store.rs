//! Session store over the application database.

use async_trait::async_trait;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

use super::entities::session::{self, ActiveModel, Entity as SessionEntity};

fn backend(e: DbErr) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

/// SeaORM-backed [`SessionStore`]; rows live in the `sessions` table.
#[derive(Debug, Clone)]
pub struct DbSessionStore {
    db: DatabaseConnection,
}

impl DbSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, id: &Id) -> session_store::Result<bool> {
        let found = SessionEntity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(backend)?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl SessionStore for DbSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.exists(&record.id).await? {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data = serde_json::to_string(&record.data)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;

        let row = ActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expires_at: Set(record.expiry_date.unix_timestamp()),
        };

        SessionEntity::insert(row)
            .on_conflict(
                OnConflict::column(session::Column::Id)
                    .update_columns([session::Column::Data, session::Column::ExpiresAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(backend)?;

        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let Some(row) = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .map_err(backend)?
        else {
            return Ok(None);
        };

        let data = serde_json::from_str(&row.data)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;
        let expiry_date = OffsetDateTime::from_unix_timestamp(row.expires_at)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;

        Ok(Some(Record {
            id: *session_id,
            data,
            expiry_date,
        }))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.db)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for DbSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(backend)?;
        tracing::debug!(deleted = result.rows_affected, "Expired sessions removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sea_orm::Database as SeaDatabase;
    use sea_orm_migration::MigratorTrait;
    use tower_sessions::cookie::time::Duration;

    use super::*;
    use crate::infra::Migrator;

    async fn store() -> DbSessionStore {
        let db = SeaDatabase::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        DbSessionStore::new(db)
    }

    fn record(expires_in: Duration) -> Record {
        let mut data = HashMap::new();
        data.insert("user".to_string(), serde_json::json!({ "email": "a@b.co" }));
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_saved_session_loads_back() {
        let store = store().await;
        let mut record = record(Duration::minutes(10));
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.data, record.data);
        assert_eq!(loaded.expiry_date.unix_timestamp(), record.expiry_date.unix_timestamp());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_row() {
        let store = store().await;
        let mut record = record(Duration::minutes(10));
        store.create(&mut record).await.unwrap();

        record.data.insert("flash".to_string(), serde_json::json!(["hi"]));
        store.save(&record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.len(), 2);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_loaded_and_gets_swept() {
        let store = store().await;
        let mut expired = record(Duration::minutes(-1));
        let mut live = record(Duration::minutes(10));
        store.create(&mut expired).await.unwrap();
        store.create(&mut live).await.unwrap();

        assert!(store.load(&expired.id).await.unwrap().is_none());

        store.delete_expired().await.unwrap();
        assert!(!store.exists(&expired.id).await.unwrap());
        assert!(store.exists(&live.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_deleted_session_is_gone() {
        let store = store().await;
        let mut record = record(Duration::minutes(10));
        store.create(&mut record).await.unwrap();

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }
}
