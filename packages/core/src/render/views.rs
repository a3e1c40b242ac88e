//! Type-specific editing views
//!
//! Every setter returns a complete replacement payload; views never mutate
//! the block they were rendered from.

use crate::models::{
    BlockContent, DraftContent, EmbedContent, HeadingLevel, ImageContent, ParagraphContent,
    PendingUpload, TitleContent, VideoContent, VideoProvider,
};
use crate::render::BlockChange;
use std::fmt;

/// Text shown in place of a block whose type is not understood
pub const UNKNOWN_BLOCK_PLACEHOLDER: &str = "Unknown block type";

const PREVIEW_CHARS: usize = 60;

fn change(block_id: &str, content: BlockContent) -> BlockChange {
    BlockChange {
        block_id: block_id.to_string(),
        content: DraftContent::new(content),
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

#[derive(Debug, Clone)]
pub struct TitleView<'a> {
    block_id: &'a str,
    content: &'a TitleContent,
}

impl<'a> TitleView<'a> {
    pub(crate) fn new(block_id: &'a str, content: &'a TitleContent) -> Self {
        Self { block_id, content }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }

    pub fn level(&self) -> HeadingLevel {
        self.content.level
    }

    pub fn set_text(&self, text: impl Into<String>) -> BlockChange {
        self.emit(TitleContent {
            text: text.into(),
            ..self.content.clone()
        })
    }

    pub fn set_level(&self, level: HeadingLevel) -> BlockChange {
        self.emit(TitleContent {
            level,
            ..self.content.clone()
        })
    }

    fn emit(&self, content: TitleContent) -> BlockChange {
        change(self.block_id, BlockContent::Title(content))
    }
}

impl fmt::Display for TitleView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.content.text.is_empty() {
            write!(f, "[title {}] (empty)", self.content.level.as_str())
        } else {
            write!(
                f,
                "[title {}] {}",
                self.content.level.as_str(),
                preview(&self.content.text)
            )
        }
    }
}

/// Paragraph view; the markup itself is edited by the rich text component
#[derive(Debug, Clone)]
pub struct ParagraphView<'a> {
    block_id: &'a str,
    content: &'a ParagraphContent,
}

impl<'a> ParagraphView<'a> {
    pub(crate) fn new(block_id: &'a str, content: &'a ParagraphContent) -> Self {
        Self { block_id, content }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn html(&self) -> &str {
        &self.content.html
    }

    pub fn set_html(&self, html: impl Into<String>) -> BlockChange {
        change(
            self.block_id,
            BlockContent::Paragraph(ParagraphContent {
                html: html.into(),
                ..self.content.clone()
            }),
        )
    }
}

impl fmt::Display for ParagraphView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[paragraph] {}", preview(&self.content.html))
    }
}

#[derive(Debug, Clone)]
pub struct ImageView<'a> {
    block_id: &'a str,
    content: &'a ImageContent,
    pending_upload: Option<&'a PendingUpload>,
}

impl<'a> ImageView<'a> {
    pub(crate) fn new(
        block_id: &'a str,
        content: &'a ImageContent,
        pending_upload: Option<&'a PendingUpload>,
    ) -> Self {
        Self {
            block_id,
            content,
            pending_upload,
        }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn url(&self) -> &str {
        &self.content.url
    }

    pub fn alt(&self) -> Option<&str> {
        self.content.alt.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.content.caption.as_deref()
    }

    pub fn pending_upload(&self) -> Option<&PendingUpload> {
        self.pending_upload
    }

    /// Whether there is anything to preview (a stored URL or a picked file)
    pub fn has_image(&self) -> bool {
        !self.content.url.is_empty() || self.pending_upload.is_some()
    }

    pub fn set_alt(&self, alt: impl Into<String>) -> BlockChange {
        self.emit(
            ImageContent {
                alt: Some(alt.into()),
                ..self.content.clone()
            },
            self.pending_upload.cloned(),
        )
    }

    pub fn set_caption(&self, caption: impl Into<String>) -> BlockChange {
        self.emit(
            ImageContent {
                caption: Some(caption.into()),
                ..self.content.clone()
            },
            self.pending_upload.cloned(),
        )
    }

    /// Point the block at an already hosted image, discarding any picked file
    pub fn set_url(&self, url: impl Into<String>) -> BlockChange {
        self.emit(
            ImageContent {
                url: url.into(),
                ..self.content.clone()
            },
            None,
        )
    }

    /// Stage a picked file; it is uploaded and its URL stored on the next save
    pub fn attach(&self, upload: PendingUpload) -> BlockChange {
        self.emit(self.content.clone(), Some(upload))
    }

    /// Remove the image, keeping alt text and caption
    pub fn clear(&self) -> BlockChange {
        self.emit(
            ImageContent {
                url: String::new(),
                ..self.content.clone()
            },
            None,
        )
    }

    fn emit(&self, content: ImageContent, pending_upload: Option<PendingUpload>) -> BlockChange {
        BlockChange {
            block_id: self.block_id.to_string(),
            content: DraftContent::new(BlockContent::Image(content))
                .with_pending_upload(pending_upload),
        }
    }
}

impl fmt::Display for ImageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[image] ")?;
        match (self.pending_upload, self.content.url.is_empty()) {
            (Some(upload), _) => write!(
                f,
                "pending upload {} ({} bytes)",
                upload.file_name(),
                upload.len()
            )?,
            (None, true) => f.write_str("(no image)")?,
            (None, false) => f.write_str(&self.content.url)?,
        }
        if let Some(alt) = self.alt() {
            write!(f, " alt=\"{}\"", alt)?;
        }
        if let Some(caption) = self.caption() {
            write!(f, " caption=\"{}\"", preview(caption))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct VideoView<'a> {
    block_id: &'a str,
    content: &'a VideoContent,
}

impl<'a> VideoView<'a> {
    pub(crate) fn new(block_id: &'a str, content: &'a VideoContent) -> Self {
        Self { block_id, content }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn url(&self) -> &str {
        &self.content.url
    }

    /// Selected provider; blocks saved without one show as YouTube
    pub fn provider(&self) -> VideoProvider {
        self.content.provider.unwrap_or_default()
    }

    pub fn set_url(&self, url: impl Into<String>) -> BlockChange {
        self.emit(VideoContent {
            url: url.into(),
            ..self.content.clone()
        })
    }

    pub fn set_provider(&self, provider: VideoProvider) -> BlockChange {
        self.emit(VideoContent {
            provider: Some(provider),
            ..self.content.clone()
        })
    }

    fn emit(&self, content: VideoContent) -> BlockChange {
        change(self.block_id, BlockContent::Video(content))
    }
}

impl fmt::Display for VideoView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[video {}] ", self.provider().as_str())?;
        if self.content.url.is_empty() {
            f.write_str("(no url)")
        } else {
            f.write_str(&self.content.url)
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbedView<'a> {
    block_id: &'a str,
    content: &'a EmbedContent,
}

impl<'a> EmbedView<'a> {
    pub(crate) fn new(block_id: &'a str, content: &'a EmbedContent) -> Self {
        Self { block_id, content }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn code(&self) -> &str {
        &self.content.code
    }

    pub fn set_code(&self, code: impl Into<String>) -> BlockChange {
        change(
            self.block_id,
            BlockContent::Embed(EmbedContent {
                code: code.into(),
                ..self.content.clone()
            }),
        )
    }
}

impl fmt::Display for EmbedView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[embed] {} chars", self.content.code.chars().count())
    }
}

/// Placeholder for blocks this build cannot edit
#[derive(Debug, Clone)]
pub struct UnknownBlockView<'a> {
    block_id: &'a str,
    tag: &'a str,
}

impl<'a> UnknownBlockView<'a> {
    pub(crate) fn new(block_id: &'a str, tag: &'a str) -> Self {
        Self { block_id, tag }
    }

    pub fn block_id(&self) -> &str {
        self.block_id
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    pub fn message(&self) -> String {
        format!("{}: {}", UNKNOWN_BLOCK_PLACEHOLDER, self.tag)
    }
}

impl fmt::Display for UnknownBlockView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.message())
    }
}
