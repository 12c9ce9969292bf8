use sqlx::SqlitePool;

use crate::db::timestamp_now;
use crate::models::{Caller, Event, NewEvent};
use crate::utils::AppError;

#[derive(Clone)]
pub struct EventCatalog {
    pool: SqlitePool,
}

impl EventCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ascending by `date`, compared as text.
    pub async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, date, time, location, image_url,
                   created_by_code, created_by_name, created_at
            FROM events
            ORDER BY date ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// The creator code is recorded as given; it is not checked against the
    /// admin directory.
    pub async fn create_event(
        &self,
        event: NewEvent,
        created_by_code: Option<&str>,
        created_by_name: Option<&str>,
    ) -> Result<i64, AppError> {
        let title = required(event.title.as_deref(), "title")?;
        let date = required(event.date.as_deref(), "date")?;
        let created_by_code = required(created_by_code, "createdByCode")?;

        let result = sqlx::query(
            r#"
            INSERT INTO events (title, description, date, time, location, image_url,
                                created_by_code, created_by_name, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(event.description)
        .bind(date)
        .bind(event.time)
        .bind(event.location)
        .bind(event.image_url)
        .bind(created_by_code)
        .bind(created_by_name)
        .bind(timestamp_now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(id, created_by = %created_by_code, "Created event");
        Ok(id)
    }

    /// The main admin may delete any event; everyone else only events created
    /// under their own code.
    pub async fn delete_event(&self, id: i64, caller: &Caller) -> Result<(), AppError> {
        let result = if caller.is_main_admin {
            sqlx::query("DELETE FROM events WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?
        } else {
            sqlx::query("DELETE FROM events WHERE id = ? AND created_by_code = ?")
                .bind(id)
                .bind(caller.code.as_deref())
                .execute(&self.pool)
                .await?
        };

        if result.rows_affected() == 0 {
            return Err(if caller.is_main_admin || !self.exists(id).await? {
                AppError::NotFound(format!("Event {} was not found", id))
            } else {
                AppError::OwnershipError("You can only delete your own events".to_string())
            });
        }

        tracing::info!(id, main_admin = caller.is_main_admin, "Deleted event");
        Ok(())
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn event(title: &str, date: &str) -> NewEvent {
        NewEvent {
            title: Some(title.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    async fn catalog() -> EventCatalog {
        EventCatalog::new(test_pool().await)
    }

    #[tokio::test]
    async fn test_list_sorted_by_date_regardless_of_insert_order() {
        let catalog = catalog().await;
        for (title, date) in [
            ("Harvest Fair", "2024-09-14"),
            ("Cleanup Day", "2024-06-01"),
            ("Block Party", "2024-07-20"),
        ] {
            catalog
                .create_event(event(title, date), Some("MAIN_ADMIN_2024"), None)
                .await
                .unwrap();
        }

        let dates: Vec<String> = catalog
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.date)
            .collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-07-20", "2024-09-14"]);
    }

    #[tokio::test]
    async fn test_create_requires_title_date_and_code() {
        let catalog = catalog().await;

        let missing_title = NewEvent {
            date: Some("2024-06-01".into()),
            ..Default::default()
        };
        let err = catalog
            .create_event(missing_title, Some("MAIN_ADMIN_2024"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = catalog
            .create_event(event("No Owner", "2024-06-01"), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        assert!(catalog.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_keeps_optional_fields() {
        let catalog = catalog().await;
        let new = NewEvent {
            title: Some("Movie Night".into()),
            description: Some("Bring a blanket".into()),
            date: Some("2024-08-02".into()),
            time: Some("19:30".into()),
            location: Some("Westside Park".into()),
            image_url: Some("https://example.org/movie.png".into()),
        };
        let id = catalog
            .create_event(new, Some("ABCD1234"), Some("Park Crew"))
            .await
            .unwrap();

        let events = catalog.list_events().await.unwrap();
        assert_eq!(events.len(), 1);
        let stored = &events[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.time.as_deref(), Some("19:30"));
        assert_eq!(stored.image_url.as_deref(), Some("https://example.org/movie.png"));
        assert_eq!(stored.created_by_code.as_deref(), Some("ABCD1234"));
        assert_eq!(stored.created_by_name.as_deref(), Some("Park Crew"));
    }

    #[tokio::test]
    async fn test_sub_admin_delete_ownership() {
        let catalog = catalog().await;
        let id = catalog
            .create_event(event("Garden Swap", "2024-05-05"), Some("OWNER001"), None)
            .await
            .unwrap();

        let err = catalog
            .delete_event(id, &Caller::sub_admin("OTHER002"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OwnershipError(_)));
        assert_eq!(catalog.list_events().await.unwrap().len(), 1);

        catalog
            .delete_event(id, &Caller::sub_admin("OWNER001"))
            .await
            .unwrap();
        assert!(catalog.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_main_admin_deletes_any_event() {
        let catalog = catalog().await;
        let id = catalog
            .create_event(event("Garden Swap", "2024-05-05"), Some("OWNER001"), None)
            .await
            .unwrap();

        catalog.delete_event(id, &Caller::main_admin()).await.unwrap();
        assert!(catalog.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_not_found() {
        let catalog = catalog().await;

        for caller in [Caller::main_admin(), Caller::sub_admin("OWNER001")] {
            let err = catalog.delete_event(404, &caller).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }
}
