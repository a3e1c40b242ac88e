//! Editor Session Tests
//!
//! State machine transitions, the admin gate, post-save refresh and session
//! events.

#[cfg(test)]
mod session_tests {
    use anyhow::Result;
    use folio_core::auth::{AuthError, AuthStore, LocalAuthProvider};
    use folio_core::forms::LoginForm;
    use folio_core::models::{BlockContent, BlockKind, DraftContent, ImageContent, PendingUpload};
    use folio_core::persistence::{
        EditorSession, PersistenceError, ProjectRepository, SessionEvent, SessionState,
    };
    use folio_core::render::{render, BlockView};
    use folio_core::store::{MemoryFileStorage, MemoryRecordStore};
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    struct Fixture {
        records: Arc<MemoryRecordStore>,
        files: Arc<MemoryFileStorage>,
        repository: Arc<ProjectRepository>,
        auth: AuthStore,
    }

    async fn fixture() -> Result<Fixture> {
        let records = Arc::new(MemoryRecordStore::new());
        let files = Arc::new(MemoryFileStorage::new());
        let repository = Arc::new(ProjectRepository::new(records.clone(), files.clone()));
        let provider = LocalAuthProvider::new().with_admin("admin@example.com", "secret1");
        let mut auth = AuthStore::new(Arc::new(provider));
        auth.login(&LoginForm::new("admin@example.com", "secret1"))
            .await?;
        Ok(Fixture {
            records,
            files,
            repository,
            auth,
        })
    }

    fn fill_fields(session: &mut EditorSession) -> Result<()> {
        let fields = session.fields_mut()?;
        fields.title = "Portfolio site".to_string();
        fields.slug = "portfolio-site".to_string();
        Ok(())
    }

    #[tokio::test]
    async fn test_new_project_starts_ready_and_empty() -> Result<()> {
        let fx = fixture().await?;

        let session = EditorSession::new_project(fx.repository.clone(), &fx.auth)?;

        assert_eq!(session.state(), SessionState::Ready);
        assert!(session.is_new());
        assert!(session.document().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_gate_requires_admin_session() -> Result<()> {
        let mut fx = fixture().await?;
        fx.auth.logout();

        let err = EditorSession::new_project(fx.repository.clone(), &fx.auth).unwrap_err();

        assert!(matches!(
            err,
            PersistenceError::Auth(AuthError::NotAuthenticated)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_acquires_id_then_reopen() -> Result<()> {
        let fx = fixture().await?;
        let mut session = EditorSession::new_project(fx.repository.clone(), &fx.auth)?;
        fill_fields(&mut session)?;
        session.document_mut()?.add(BlockKind::Title);
        session.document_mut()?.add(BlockKind::Video);

        session.save().await?;

        assert_eq!(session.state(), SessionState::Ready);
        let id = session.project_id().expect("saved project has an id").to_string();
        assert_eq!(fx.records.write_attempts(), 1);

        let mut reopened =
            EditorSession::for_project(fx.repository.clone(), &fx.auth, id.clone())?;
        assert_eq!(reopened.state(), SessionState::Loading);
        assert!(reopened.document_mut().is_err());

        reopened.load().await?;

        assert_eq!(reopened.state(), SessionState::Ready);
        assert_eq!(reopened.document().ids(), session.document().ids());
        assert_eq!(reopened.fields(), session.fields());

        reopened.save().await?;
        assert_eq!(reopened.project_id(), Some(id.as_str()));
        assert_eq!(fx.records.write_attempts(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_load_never_becomes_ready() -> Result<()> {
        let fx = fixture().await?;
        let mut session = EditorSession::for_project(fx.repository.clone(), &fx.auth, "missing")?;

        let err = session.load().await.unwrap_err();

        assert!(matches!(err, PersistenceError::Load { .. }));
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.document().is_empty());
        assert!(matches!(
            session.save().await,
            Err(PersistenceError::NotReady(SessionState::Loading))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_keeps_document_unchanged() -> Result<()> {
        let fx = fixture().await?;
        let mut session = EditorSession::new_project(fx.repository.clone(), &fx.auth)?;
        fill_fields(&mut session)?;
        let image = session.document_mut()?.add(BlockKind::Image).id().to_string();
        let change = DraftContent::new(BlockContent::Image(ImageContent::default()))
            .with_pending_upload(Some(PendingUpload::new("broken.png", vec![1, 2, 3])));
        session.document_mut()?.update(&image, change);
        fx.files.fail_on("broken.png");
        let before = session.document().clone();

        let result = session.save().await;

        assert!(matches!(result, Err(PersistenceError::Upload(_))));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.document(), &before);
        assert!(session.is_new());
        assert_eq!(fx.records.write_attempts(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_abandoned_save_returns_to_ready() -> Result<()> {
        let records = Arc::new(MemoryRecordStore::new());
        let files = Arc::new(MemoryFileStorage::new().with_latency(Duration::from_millis(200)));
        let repository = Arc::new(ProjectRepository::new(records.clone(), files));
        let fx = fixture().await?;
        let mut session = EditorSession::new_project(repository, &fx.auth)?;
        fill_fields(&mut session)?;
        let image = session.document_mut()?.add(BlockKind::Image).id().to_string();
        let change = DraftContent::new(BlockContent::Image(ImageContent::default()))
            .with_pending_upload(Some(PendingUpload::new("slow.png", vec![1, 2, 3])));
        session.document_mut()?.update(&image, change);

        let abandoned = timeout(Duration::from_millis(20), session.save()).await;

        assert!(abandoned.is_err());
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(records.write_attempts(), 0);
        assert_eq!(session.document().pending_uploads(), 1);

        session.save().await?;
        assert!(session.project_id().is_some());
        assert_eq!(records.write_attempts(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_replaces_pending_upload_with_url() -> Result<()> {
        let fx = fixture().await?;
        let mut session = EditorSession::new_project(fx.repository.clone(), &fx.auth)?;
        fill_fields(&mut session)?;
        let image = session.document_mut()?.add(BlockKind::Image).id().to_string();

        let change = match render(&session.document().blocks()[0]) {
            BlockView::Image(view) => view.attach(PendingUpload::new("hero.png", vec![9; 8])),
            other => panic!("unexpected view {:?}", other),
        };
        assert!(session.apply(change)?);
        assert_eq!(session.document().pending_uploads(), 1);

        session.save().await?;

        let block = session.document().get(&image).expect("block kept its id");
        assert!(block.pending_upload().is_none());
        match block.content() {
            BlockContent::Image(img) => assert!(img.url.ends_with("/hero.png")),
            other => panic!("expected image, got {:?}", other),
        }
        assert_eq!(session.document().pending_uploads(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_events_are_published() -> Result<()> {
        let fx = fixture().await?;
        let mut session = EditorSession::new_project(fx.repository.clone(), &fx.auth)?;
        let mut rx = session.subscribe();

        // Invalid fields: save fails
        assert!(session.save().await.is_err());
        let event = timeout(Duration::from_secs(1), rx.recv()).await??;
        assert!(matches!(event, SessionEvent::SaveFailed { .. }));

        fill_fields(&mut session)?;
        session.save().await?;
        let event = timeout(Duration::from_secs(1), rx.recv()).await??;
        match event {
            SessionEvent::Saved {
                project_id,
                created,
            } => {
                assert!(created);
                assert_eq!(Some(project_id.as_str()), session.project_id());
            }
            other => panic!("expected Saved, got {:?}", other),
        }
        Ok(())
    }
}
