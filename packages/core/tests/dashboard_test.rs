//! Dashboard Tests

#[cfg(test)]
mod dashboard_tests {
    use anyhow::Result;
    use folio_core::auth::{AuthError, AuthStore, LocalAuthProvider};
    use folio_core::dashboard::Dashboard;
    use folio_core::forms::LoginForm;
    use folio_core::models::{ProjectFields, ProjectStatus};
    use folio_core::persistence::{PersistenceError, ProjectRepository};
    use folio_core::store::{MemoryFileStorage, MemoryRecordStore};
    use std::sync::Arc;

    fn repository() -> ProjectRepository {
        ProjectRepository::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryFileStorage::new()),
        )
    }

    fn auth_store() -> AuthStore {
        let provider = LocalAuthProvider::new()
            .with_admin("admin@example.com", "secret1")
            .with_user("viewer@example.com", "viewer1");
        AuthStore::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_lists_newest_first() -> Result<()> {
        let repository = repository();
        let mut auth = auth_store();
        auth.login(&LoginForm::new("admin@example.com", "secret1"))
            .await?;

        for (title, slug) in [("First one", "first"), ("Second one", "second")] {
            repository
                .save(None, &ProjectFields::new(title, slug), &[])
                .await?;
        }
        repository
            .save(
                None,
                &ProjectFields::new("Third one", "third").with_status(ProjectStatus::Published),
                &[],
            )
            .await?;

        let dashboard = Dashboard::load(&auth, &repository).await?;

        assert_eq!(dashboard.total(), 3);
        let titles: Vec<&str> = dashboard
            .projects()
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Third one", "Second one", "First one"]);
        assert_eq!(dashboard.projects()[0].status, ProjectStatus::Published);
        assert!(dashboard.projects()[0].to_string().contains("published"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_dashboard() -> Result<()> {
        let repository = repository();
        let mut auth = auth_store();
        auth.login(&LoginForm::new("admin@example.com", "secret1"))
            .await?;

        let dashboard = Dashboard::load(&auth, &repository).await?;

        assert!(dashboard.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_and_signed_out_are_refused() -> Result<()> {
        let repository = repository();
        let mut auth = auth_store();

        let err = Dashboard::load(&auth, &repository).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Auth(AuthError::NotAuthenticated)
        ));

        auth.login(&LoginForm::new("viewer@example.com", "viewer1"))
            .await?;
        let err = Dashboard::load(&auth, &repository).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Auth(AuthError::NotElevated(_))
        ));
        Ok(())
    }
}
