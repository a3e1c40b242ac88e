//! Command implementations
//!
//! Each mutating command runs one full editing session: open the project,
//! apply the change through the block views, save.

use anyhow::{anyhow, bail, Context as _, Result};
use clap::Args;
use folio_core::auth::{AuthStore, LocalAuthProvider};
use folio_core::config::FolioConfig;
use folio_core::dashboard::Dashboard;
use folio_core::editor::{ConfirmDelete, DocumentState, DELETE_CONFIRMATION_PROMPT};
use folio_core::forms::LoginForm;
use folio_core::models::{BlockKind, DraftBlock, HeadingLevel, PendingUpload, ProjectStatus, VideoProvider};
use folio_core::persistence::{EditorSession, ProjectRepository};
use folio_core::render::{render, render_all, BlockChange, BlockView};
use folio_core::store::{JsonFileRecordStore, LocalFileStorage};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

/// Project form fields; unset flags leave the field alone
#[derive(Args, Debug, Default, Clone)]
pub struct FieldEdits {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub slug: Option<String>,
    /// Short summary; pass an empty string to clear it
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long)]
    pub status: Option<ProjectStatus>,
}

/// Block content edits; each flag only applies to the block kinds that have it
#[derive(Args, Debug, Default, Clone)]
pub struct BlockEdits {
    /// Title text
    #[arg(long)]
    pub text: Option<String>,
    /// Title heading level (h1, h2, h3)
    #[arg(long)]
    pub level: Option<HeadingLevel>,
    /// Paragraph HTML
    #[arg(long)]
    pub html: Option<String>,
    /// Image or video URL
    #[arg(long)]
    pub url: Option<String>,
    /// Video provider (youtube, vimeo, other)
    #[arg(long)]
    pub provider: Option<VideoProvider>,
    /// Embed code
    #[arg(long)]
    pub code: Option<String>,
    /// Image alt text
    #[arg(long)]
    pub alt: Option<String>,
    /// Image caption
    #[arg(long)]
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
enum Edit {
    Text(String),
    Level(HeadingLevel),
    Html(String),
    Url(String),
    Provider(VideoProvider),
    Code(String),
    Alt(String),
    Caption(String),
}

impl Edit {
    fn flag(&self) -> &'static str {
        match self {
            Edit::Text(_) => "--text",
            Edit::Level(_) => "--level",
            Edit::Html(_) => "--html",
            Edit::Url(_) => "--url",
            Edit::Provider(_) => "--provider",
            Edit::Code(_) => "--code",
            Edit::Alt(_) => "--alt",
            Edit::Caption(_) => "--caption",
        }
    }

    /// Change produced by this edit on `view`, or `None` if the kind lacks the field
    fn change_for(self, view: BlockView<'_>) -> Option<BlockChange> {
        let change = match (view, self) {
            (BlockView::Title(v), Edit::Text(text)) => v.set_text(text),
            (BlockView::Title(v), Edit::Level(level)) => v.set_level(level),
            (BlockView::Paragraph(v), Edit::Html(html)) => v.set_html(html),
            (BlockView::Image(v), Edit::Url(url)) => v.set_url(url),
            (BlockView::Image(v), Edit::Alt(alt)) => v.set_alt(alt),
            (BlockView::Image(v), Edit::Caption(caption)) => v.set_caption(caption),
            (BlockView::Video(v), Edit::Url(url)) => v.set_url(url),
            (BlockView::Video(v), Edit::Provider(provider)) => v.set_provider(provider),
            (BlockView::Embed(v), Edit::Code(code)) => v.set_code(code),
            _ => return None,
        };
        Some(change)
    }
}

impl BlockEdits {
    fn into_edits(self) -> Vec<Edit> {
        let mut edits = Vec::new();
        edits.extend(self.text.map(Edit::Text));
        edits.extend(self.level.map(Edit::Level));
        edits.extend(self.html.map(Edit::Html));
        edits.extend(self.url.map(Edit::Url));
        edits.extend(self.provider.map(Edit::Provider));
        edits.extend(self.code.map(Edit::Code));
        edits.extend(self.alt.map(Edit::Alt));
        edits.extend(self.caption.map(Edit::Caption));
        edits
    }
}

/// Signed-in admin plus the repository every command works against
pub struct Context {
    repository: Arc<ProjectRepository>,
    auth: AuthStore,
}

impl Context {
    pub fn new(repository: Arc<ProjectRepository>, auth: AuthStore) -> Self {
        Self { repository, auth }
    }

    /// Build the local backend described by `config` and sign in
    pub async fn connect(config: FolioConfig, email: &str, password: &str) -> Result<Self> {
        let admin = config.admin.as_ref().ok_or_else(|| {
            anyhow!("No admin account configured: set FOLIO_ADMIN_EMAIL and FOLIO_ADMIN_PASSWORD")
        })?;
        let mut auth = AuthStore::new(Arc::new(LocalAuthProvider::from_credentials(admin)));
        auth.login(&LoginForm::new(email, password)).await?;

        let records = Arc::new(JsonFileRecordStore::new(config.records_dir()));
        let files = Arc::new(LocalFileStorage::new(
            config.media_dir(),
            config.backend_url.clone(),
            config.media_collection.clone(),
        ));
        let repository = Arc::new(ProjectRepository::from_config(&config, records, files));
        tracing::debug!("Using data directory {}", config.data_dir.display());

        Ok(Self::new(repository, auth))
    }

    async fn open(&self, project: &str) -> Result<EditorSession> {
        EditorSession::open(self.repository.clone(), &self.auth, project)
            .await
            .with_context(|| format!("Failed to open project {}", project))
    }
}

/// Resolve a block reference: an exact block id, or a 1-based position
fn resolve_block(document: &DocumentState, reference: &str) -> Result<String> {
    if document.get(reference).is_some() {
        return Ok(reference.to_string());
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(block) = position.checked_sub(1).and_then(|i| document.blocks().get(i)) {
            return Ok(block.id().to_string());
        }
    }
    bail!(
        "No block {} (the project has {} blocks)",
        reference,
        document.len()
    )
}

fn apply_fields(session: &mut EditorSession, edits: &FieldEdits) -> Result<()> {
    let fields = session.fields_mut()?;
    if let Some(title) = &edits.title {
        fields.title = title.clone();
    }
    if let Some(slug) = &edits.slug {
        fields.slug = slug.clone();
    }
    if let Some(excerpt) = &edits.excerpt {
        fields.excerpt = (!excerpt.is_empty()).then(|| excerpt.clone());
    }
    if let Some(status) = edits.status {
        fields.status = status;
    }
    Ok(())
}

/// Apply every edit to block `block_id` in order; returns how many were applied
fn apply_edits(session: &mut EditorSession, block_id: &str, edits: BlockEdits) -> Result<usize> {
    let edits = edits.into_edits();
    if edits.is_empty() {
        bail!("Nothing to change: pass at least one field flag");
    }

    let mut applied = 0;
    for edit in edits {
        let flag = edit.flag();
        let block = session
            .document()
            .get(block_id)
            .ok_or_else(|| anyhow!("Block {} disappeared", block_id))?;
        let tag = block.tag().to_string();
        let change = edit
            .change_for(render(block))
            .ok_or_else(|| anyhow!("{} does not apply to a {} block", flag, tag))?;
        if session.apply(change)? {
            applied += 1;
        }
    }
    Ok(applied)
}

async fn save(session: &mut EditorSession) -> Result<()> {
    session.save().await.context("Save failed")?;
    Ok(())
}

pub async fn list(ctx: &Context) -> Result<()> {
    let dashboard = Dashboard::load(&ctx.auth, &ctx.repository).await?;
    if dashboard.is_empty() {
        println!("No projects yet");
        return Ok(());
    }
    for project in dashboard.projects() {
        println!("{}", project);
    }
    Ok(())
}

fn print_document(session: &EditorSession) {
    let fields = session.fields();
    println!("{} ({})", fields.title, fields.status);
    println!("slug: {}", fields.slug);
    if let Some(excerpt) = &fields.excerpt {
        println!("excerpt: {}", excerpt);
    }
    println!();
    for (i, view) in render_all(session.document()).iter().enumerate() {
        println!("{:>3}. {}  {}", i + 1, view.block_id(), view);
    }
}

pub async fn show(ctx: &Context, project: &str) -> Result<()> {
    let session = ctx.open(project).await?;
    print_document(&session);
    Ok(())
}

pub async fn create(ctx: &Context, fields: &FieldEdits) -> Result<()> {
    let mut session = EditorSession::new_project(ctx.repository.clone(), &ctx.auth)?;
    apply_fields(&mut session, fields)?;
    save(&mut session).await?;
    if let Some(id) = session.project_id() {
        println!("{}", id);
    }
    Ok(())
}

pub async fn set_fields(ctx: &Context, project: &str, fields: &FieldEdits) -> Result<()> {
    let mut session = ctx.open(project).await?;
    apply_fields(&mut session, fields)?;
    save(&mut session).await
}

pub async fn add(ctx: &Context, project: &str, kind: BlockKind) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let id = session.document_mut()?.add(kind).id().to_string();
    save(&mut session).await?;
    println!("{}", id);
    Ok(())
}

pub async fn edit(ctx: &Context, project: &str, block: &str, edits: &BlockEdits) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let block_id = resolve_block(session.document(), block)?;
    let applied = apply_edits(&mut session, &block_id, edits.clone())?;
    tracing::debug!("Applied {} edits to block {}", applied, block_id);
    save(&mut session).await
}

pub async fn attach_image(ctx: &Context, project: &str, block: &str, file: &Path) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", file.display()))?;

    let mut session = ctx.open(project).await?;
    let block_id = resolve_block(session.document(), block)?;
    let change = match session.document().get(&block_id).map(render) {
        Some(BlockView::Image(view)) => view.attach(PendingUpload::new(file_name, data)),
        Some(other) => bail!("Block {} is not an image block ({})", block_id, other),
        None => bail!("No block {}", block_id),
    };
    session.apply(change)?;
    save(&mut session).await
}

pub async fn clear_image(ctx: &Context, project: &str, block: &str) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let block_id = resolve_block(session.document(), block)?;
    let change = match session.document().get(&block_id).map(render) {
        Some(BlockView::Image(view)) => view.clear(),
        Some(other) => bail!("Block {} is not an image block ({})", block_id, other),
        None => bail!("No block {}", block_id),
    };
    session.apply(change)?;
    save(&mut session).await
}

pub async fn duplicate(ctx: &Context, project: &str, block: &str) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let block_id = resolve_block(session.document(), block)?;
    let copy = session
        .document_mut()?
        .duplicate(&block_id)
        .map(|b| b.id().to_string())
        .ok_or_else(|| anyhow!("No block {}", block_id))?;
    save(&mut session).await?;
    println!("{}", copy);
    Ok(())
}

pub async fn move_block(ctx: &Context, project: &str, block: &str, onto: &str) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let source = resolve_block(session.document(), block)?;
    let target = resolve_block(session.document(), onto)?;
    if !session.document_mut()?.reorder(&source, &target) {
        println!("Nothing to move");
        return Ok(());
    }
    save(&mut session).await
}

/// Asks on the terminal before a block is deleted
struct TerminalConfirm;

impl ConfirmDelete for TerminalConfirm {
    fn confirm_delete(&self, block: &DraftBlock) -> bool {
        print!("{} {} [y/N] ", DELETE_CONFIRMATION_PROMPT, render(block));
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

pub async fn delete(ctx: &Context, project: &str, block: &str, yes: bool) -> Result<()> {
    let mut session = ctx.open(project).await?;
    let block_id = resolve_block(session.document(), block)?;
    let document = session.document_mut()?;
    let deleted = if yes {
        document.delete(&block_id, &|_: &DraftBlock| true)
    } else {
        document.delete(&block_id, &TerminalConfirm)
    };
    if !deleted {
        println!("Kept block {}", block_id);
        return Ok(());
    }
    save(&mut session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::models::{BlockContent, ProjectFields};
    use folio_core::store::{MemoryFileStorage, MemoryRecordStore};

    async fn context() -> Result<Context> {
        let repository = Arc::new(ProjectRepository::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryFileStorage::new()),
        ));
        let provider = LocalAuthProvider::new().with_admin("admin@example.com", "secret1");
        let mut auth = AuthStore::new(Arc::new(provider));
        auth.login(&LoginForm::new("admin@example.com", "secret1"))
            .await?;
        Ok(Context::new(repository, auth))
    }

    async fn seeded(ctx: &Context, kinds: &[BlockKind]) -> Result<String> {
        let mut session = EditorSession::new_project(ctx.repository.clone(), &ctx.auth)?;
        *session.fields_mut()? = ProjectFields::new("Portfolio site", "portfolio-site");
        for kind in kinds {
            session.document_mut()?.add(*kind);
        }
        session.save().await?;
        Ok(session.project_id().expect("created").to_string())
    }

    #[test]
    fn test_resolve_block_by_id_or_position() {
        let mut doc = DocumentState::new();
        let first = doc.add(BlockKind::Title).id().to_string();
        let second = doc.add(BlockKind::Embed).id().to_string();

        assert_eq!(resolve_block(&doc, &first).unwrap(), first);
        assert_eq!(resolve_block(&doc, "2").unwrap(), second);
        assert!(resolve_block(&doc, "0").is_err());
        assert!(resolve_block(&doc, "3").is_err());
        assert!(resolve_block(&doc, "nope").is_err());
    }

    #[tokio::test]
    async fn test_edit_applies_every_flag() -> Result<()> {
        let ctx = context().await?;
        let id = seeded(&ctx, &[BlockKind::Title]).await?;
        let edits = BlockEdits {
            text: Some("Results".to_string()),
            level: Some(HeadingLevel::H3),
            ..Default::default()
        };

        edit(&ctx, &id, "1", &edits).await?;

        let session = ctx.open(&id).await?;
        match session.document().blocks()[0].content() {
            BlockContent::Title(title) => {
                assert_eq!(title.text, "Results");
                assert_eq!(title.level, HeadingLevel::H3);
            }
            other => panic!("expected title, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_rejects_flag_for_other_kind() -> Result<()> {
        let ctx = context().await?;
        let id = seeded(&ctx, &[BlockKind::Paragraph]).await?;
        let edits = BlockEdits {
            code: Some("<iframe></iframe>".to_string()),
            ..Default::default()
        };

        let err = edit(&ctx, &id, "1", &edits).await.unwrap_err();

        assert!(err.to_string().contains("--code"));
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_image_uploads_on_save() -> Result<()> {
        let ctx = context().await?;
        let id = seeded(&ctx, &[BlockKind::Image]).await?;
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("hero.png");
        std::fs::write(&path, [1u8, 2, 3])?;

        attach_image(&ctx, &id, "1", &path).await?;

        let session = ctx.open(&id).await?;
        match session.document().blocks()[0].content() {
            BlockContent::Image(img) => assert!(img.url.ends_with("/hero.png")),
            other => panic!("expected image, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_move_and_confirmed_delete() -> Result<()> {
        let ctx = context().await?;
        let id = seeded(&ctx, &[BlockKind::Title, BlockKind::Paragraph, BlockKind::Video]).await?;

        move_block(&ctx, &id, "3", "1").await?;
        delete(&ctx, &id, "2", true).await?;

        let session = ctx.open(&id).await?;
        let kinds: Vec<_> = session
            .document()
            .blocks()
            .iter()
            .filter_map(|b| b.kind())
            .collect();
        assert_eq!(kinds, vec![BlockKind::Video, BlockKind::Paragraph]);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_fields_clears_excerpt() -> Result<()> {
        let ctx = context().await?;
        let id = seeded(&ctx, &[]).await?;
        let with_excerpt = FieldEdits {
            excerpt: Some("A short summary".to_string()),
            status: Some(ProjectStatus::Published),
            ..Default::default()
        };
        set_fields(&ctx, &id, &with_excerpt).await?;

        let cleared = FieldEdits {
            excerpt: Some(String::new()),
            ..Default::default()
        };
        set_fields(&ctx, &id, &cleared).await?;

        let session = ctx.open(&id).await?;
        assert_eq!(session.fields().excerpt, None);
        assert_eq!(session.fields().status, ProjectStatus::Published);
        Ok(())
    }
}
