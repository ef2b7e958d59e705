//! User directory: creation and identity resolution.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use tracing::info;

use kassa_shared::AppError;
use kassa_shared::types::{UserId, UserUuid};

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// No user carries this external id.
    #[error("User not found: {0}")]
    NotFound(UserUuid),

    /// First or last name is blank.
    #[error("Invalid user profile: {0}")]
    InvalidProfile(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            // An authenticated subject with no user row is a credential problem
            UserError::NotFound(_) => Self::Unauthorized("Unknown user".to_string()),
            UserError::InvalidProfile(message) => Self::validation("invalid_profile", message),
            UserError::Database(e) => Self::Storage(e.to_string()),
        }
    }
}

/// Profile fields for a new user.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// User repository.
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

    /// Creates a user with a fresh external id.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is blank or the insert fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(UserError::InvalidProfile(
                "first and last name are required".to_string(),
            ));
        }

        let user = users::ActiveModel {
            uuid: Set(UserUuid::new().into_inner()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            email: Set(input.email),
            phone: Set(input.phone),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(user_id = user.id, uuid = %user.uuid, "User created");
        Ok(user)
    }

    /// Finds a user by external id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_uuid(&self, uuid: UserUuid) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Uuid.eq(uuid.into_inner()))
            .one(&self.db)
            .await?)
    }

    /// Finds a user by internal id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find_by_id(id.get()).one(&self.db).await?)
    }

    /// Joins an external user id to its internal numeric key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user carries `uuid`.
    pub async fn resolve_internal_id(&self, uuid: UserUuid) -> Result<UserId, UserError> {
        let id: Option<i64> = users::Entity::find()
            .select_only()
            .column(users::Column::Id)
            .filter(users::Column::Uuid.eq(uuid.into_inner()))
            .into_tuple()
            .one(&self.db)
            .await?;

        id.map(UserId).ok_or(UserError::NotFound(uuid))
    }
}
