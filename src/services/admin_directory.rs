use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::timestamp_now;
use crate::models::{AdminCode, Caller};
use crate::utils::AppError;

const MAX_CODE_ATTEMPTS: usize = 5;

/// Admin access codes: lookup, and main-admin-only management of sub-admin grants.
#[derive(Clone)]
pub struct AdminDirectory {
    pool: SqlitePool,
}

impl AdminDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `None` means the code is unknown. Store faults surface as errors.
    pub async fn verify(&self, code: Option<&str>) -> Result<Option<AdminCode>, AppError> {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, AdminCode>(
            "SELECT id, code, sub_admin_name, is_main_admin, created_at FROM admin_codes WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_sub_admin_code(
        &self,
        caller: &Caller,
        sub_admin_name: Option<&str>,
    ) -> Result<String, AppError> {
        if !caller.is_main_admin {
            return Err(AppError::AuthorizationError(
                "Only main admin can create codes".to_string(),
            ));
        }

        let name = sub_admin_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::ValidationError("subAdminName is required".to_string()))?;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            let inserted = sqlx::query(
                "INSERT INTO admin_codes (code, sub_admin_name, is_main_admin, created_at) VALUES (?, ?, FALSE, ?)",
            )
            .bind(&code)
            .bind(name)
            .bind(timestamp_now())
            .execute(&self.pool)
            .await;

            match inserted {
                Ok(_) => {
                    tracing::info!(code = %code, name = %name, "Created sub-admin code");
                    return Ok(code);
                }
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                    tracing::warn!(code = %code, "Generated admin code collided, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::InternalServerError(
            "Could not generate a unique admin code".to_string(),
        ))
    }

    /// All codes, newest first.
    pub async fn list_codes(&self, caller: &Caller) -> Result<Vec<AdminCode>, AppError> {
        if !caller.is_main_admin {
            return Err(AppError::AuthorizationError(
                "Only main admin can view codes".to_string(),
            ));
        }

        let rows = sqlx::query_as::<_, AdminCode>(
            r#"
            SELECT id, code, sub_admin_name, is_main_admin, created_at
            FROM admin_codes
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The main admin row can never be deleted, whatever the caller claims.
    /// A missing code and the main code are reported the same way.
    pub async fn delete_code(&self, caller: &Caller, code: &str) -> Result<(), AppError> {
        if !caller.is_main_admin {
            if self.is_main_code(code).await? {
                return Err(protected_or_missing());
            }
            return Err(AppError::AuthorizationError(
                "Only main admin can delete codes".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM admin_codes WHERE code = ? AND is_main_admin = FALSE")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(protected_or_missing());
        }

        tracing::info!(code = %code, "Deleted admin code");
        Ok(())
    }

    async fn is_main_code(&self, code: &str) -> Result<bool, AppError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM admin_codes WHERE code = ? AND is_main_admin = TRUE")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}

fn protected_or_missing() -> AppError {
    AppError::ProtectedOrMissing("Cannot delete main admin code or code not found".to_string())
}

/// Eight upper-case hex digits taken from a random v4 UUID.
fn generate_code() -> String {
    let mut code = Uuid::new_v4().simple().to_string();
    code.truncate(8);
    code.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn directory() -> AdminDirectory {
        AdminDirectory::new(test_pool().await)
    }

    #[test]
    fn test_generated_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), 8);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[tokio::test]
    async fn test_verify_seeded_main_code() {
        let dir = directory().await;
        let row = dir.verify(Some("MAIN_ADMIN_2024")).await.unwrap().unwrap();
        assert!(row.is_main_admin);
        assert_eq!(row.sub_admin_name, "Main Administrator");
    }

    #[tokio::test]
    async fn test_verify_unknown_or_empty_code() {
        let dir = directory().await;
        assert!(dir.verify(Some("NOPE")).await.unwrap().is_none());
        assert!(dir.verify(Some("")).await.unwrap().is_none());
        assert!(dir.verify(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_verify_sub_admin() {
        let dir = directory().await;
        let code = dir
            .create_sub_admin_code(&Caller::main_admin(), Some("Riverside Crew"))
            .await
            .unwrap();

        let row = dir.verify(Some(&code)).await.unwrap().unwrap();
        assert!(!row.is_main_admin);
        assert_eq!(row.sub_admin_name, "Riverside Crew");
    }

    #[tokio::test]
    async fn test_non_main_cannot_manage_codes() {
        let dir = directory().await;
        let caller = Caller::sub_admin("WHATEVER");

        let err = dir
            .create_sub_admin_code(&caller, Some("Sneaky"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));

        let err = dir.list_codes(&caller).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));

        let codes = dir.list_codes(&Caller::main_admin()).await.unwrap();
        assert_eq!(codes.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let dir = directory().await;
        let err = dir
            .create_sub_admin_code(&Caller::main_admin(), Some("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let dir = directory().await;
        let main = Caller::main_admin();
        let first = dir.create_sub_admin_code(&main, Some("First")).await.unwrap();
        let second = dir.create_sub_admin_code(&main, Some("Second")).await.unwrap();

        let codes: Vec<String> = dir
            .list_codes(&main)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec![second, first, "MAIN_ADMIN_2024".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_sub_admin_code() {
        let dir = directory().await;
        let main = Caller::main_admin();
        let code = dir.create_sub_admin_code(&main, Some("Temp")).await.unwrap();

        dir.delete_code(&main, &code).await.unwrap();
        assert!(dir.verify(Some(&code)).await.unwrap().is_none());

        let err = dir.delete_code(&main, &code).await.unwrap_err();
        assert!(matches!(err, AppError::ProtectedOrMissing(_)));
    }

    #[tokio::test]
    async fn test_main_code_is_never_deleted() {
        let dir = directory().await;

        for caller in [Caller::main_admin(), Caller::anonymous()] {
            let err = dir.delete_code(&caller, "MAIN_ADMIN_2024").await.unwrap_err();
            assert!(matches!(err, AppError::ProtectedOrMissing(_)));
        }
        assert!(dir.verify(Some("MAIN_ADMIN_2024")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_non_main_delete_of_sub_code_is_forbidden() {
        let dir = directory().await;
        let code = dir
            .create_sub_admin_code(&Caller::main_admin(), Some("Keep"))
            .await
            .unwrap();

        let err = dir
            .delete_code(&Caller::sub_admin(code.clone()), &code)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthorizationError(_)));
        assert!(dir.verify(Some(&code)).await.unwrap().is_some());
    }
}
