use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::domain::{AuthError, AuthResult, RevocationEntry, RevocationStore};
use crate::infrastructure::database::entities::revoked_token;
use crate::shared::InfraError;

/// SQL-backed revocation list.
#[derive(Clone)]
pub struct RevokedTokenRepository {
    db: DatabaseConnection,
}

impl RevokedTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(e: DbErr) -> AuthError {
    InfraError::Database(e).into()
}

#[async_trait]
impl RevocationStore for RevokedTokenRepository {
    async fn save(&self, entry: &RevocationEntry) -> AuthResult<()> {
        let row = revoked_token::ActiveModel {
            token_id: Set(entry.token_id.clone()),
            subject: Set(entry.subject.clone()),
            revoked_at: Set(entry.revoked_at),
            expires_at: Set(entry.expires_at),
        };

        let result = revoked_token::Entity::insert(row)
            .on_conflict(
                OnConflict::column(revoked_token::Column::TokenId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.db)
            .await;

        match result {
            // Already revoked
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn load_live(&self, now: DateTime<Utc>) -> AuthResult<Vec<RevocationEntry>> {
        let rows = revoked_token::Entity::find()
            .filter(revoked_token::Column::ExpiresAt.gt(now))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| RevocationEntry {
                token_id: row.token_id,
                subject: row.subject,
                revoked_at: row.revoked_at,
                expires_at: row.expires_at,
            })
            .collect())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let result = revoked_token::Entity::delete_many()
            .filter(revoked_token::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
