//! User Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{UserRecord, UserRepositoryPort};
use crate::application::queries::GetUserQuery;

/// Get User Handler
pub struct GetUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl GetUserHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    pub async fn handle(&self, query: GetUserQuery) -> Result<UserRecord, ApplicationError> {
        self.user_repo
            .find_by_id(query.user_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("User", query.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NewUser;
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteUserRepository,
    };

    #[tokio::test]
    async fn test_get_user() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let repo = Arc::new(SqliteUserRepository::new(pool));
        let id = repo
            .create(&NewUser {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                password_hash: "scrypt$placeholder".to_string(),
            })
            .await
            .unwrap()
            .last_insert_rowid;

        let handler = GetUserHandler::new(repo);
        let user = handler.handle(GetUserQuery { user_id: id }).await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let missing = handler.handle(GetUserQuery { user_id: id + 1 }).await.unwrap_err();
        assert!(matches!(missing, ApplicationError::NotFound { .. }));
    }
}
