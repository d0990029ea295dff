use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, Set, SqlErr, Unchanged,
};

use crate::domain::{
    AuthError, AuthResult, CredentialStore, UserChanges, UserRecord, UserRole,
};
use crate::infrastructure::database::entities::user;
use crate::shared::InfraError;

/// SQL-backed credential store.
///
/// Uniqueness of usernames is enforced by the primary key, so concurrent
/// registrations are serialized by the database itself.
#[derive(Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::User => UserRole::User,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::User => user::UserRole::User,
    }
}

fn user_model_to_domain(model: user::Model) -> UserRecord {
    UserRecord {
        username: model.username,
        password_hash: model.password_hash,
        salt: model.salt,
        role: entity_role_to_domain(model.role),
        email: model.email,
        display_name: model.display_name,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn db_err(e: DbErr) -> AuthError {
    InfraError::Database(e).into()
}

// ── Store implementation ────────────────────────────────────────

#[async_trait]
impl CredentialStore for UserRepository {
    async fn insert(&self, record: UserRecord) -> AuthResult<()> {
        let username = record.username.clone();
        let new_user = user::ActiveModel {
            username: Set(record.username),
            password_hash: Set(record.password_hash),
            salt: Set(record.salt),
            role: Set(domain_role_to_entity(record.role)),
            email: Set(record.email),
            display_name: Set(record.display_name),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };

        user::Entity::insert(new_user)
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::DuplicateUser(username),
                _ => db_err(e),
            })?;

        Ok(())
    }

    async fn find(&self, username: &str) -> AuthResult<Option<UserRecord>> {
        let model = user::Entity::find_by_id(username)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn update(&self, username: &str, changes: UserChanges) -> AuthResult<UserRecord> {
        let (password_hash, salt) = match changes.password {
            Some(p) => (Set(p.hash), Set(p.salt)),
            None => (NotSet, NotSet),
        };

        // A single UPDATE statement: the row changes all at once or not at all.
        let active = user::ActiveModel {
            username: Unchanged(username.to_string()),
            password_hash,
            salt,
            role: NotSet,
            email: changes.email.map_or(NotSet, |e| Set(Some(e))),
            display_name: changes.display_name.map_or(NotSet, |d| Set(Some(d))),
            created_at: NotSet,
            updated_at: Set(changes.updated_at),
        };

        let updated = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                AuthError::NotFound(username.to_string())
            }
            other => db_err(other),
        })?;

        Ok(user_model_to_domain(updated))
    }

    async fn remove(&self, username: &str) -> AuthResult<()> {
        let result = user::Entity::delete_by_id(username)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AuthError::NotFound(username.to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> AuthResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
