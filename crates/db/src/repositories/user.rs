//! User repository for credential storage and lookup.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email already registered.
    #[error("Email '{0}' is already registered")]
    DuplicateEmail(String),

    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Unique email address.
    pub email: String,
    /// Argon2id PHC hash; never the plaintext.
    pub password_hash: String,
    /// Display name.
    pub full_name: String,
    /// Assigned role.
    pub role: UserRole,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user with a unique email.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` when the address is taken.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(&input.email))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            full_name: Set(input.full_name),
            role: Set(input.role),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Finds a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }
}
