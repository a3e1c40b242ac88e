//! Content Block Model
//!
//! A project body is an ordered sequence of [`ContentBlock`]s. Each block has a
//! stable id, a type tag and a payload whose shape is fully determined by the tag.
//!
//! # Wire Format
//!
//! Blocks are persisted as part of the project's `content_blocks` JSON field:
//!
//! ```json
//! { "id": "3f0c…", "type": "title", "content": { "text": "Intro", "level": "h2" } }
//! ```
//!
//! Blocks with a tag this build does not know (including a `null`, numeric or
//! missing `type`), or with a payload that does not match its tag, are kept as
//! [`BlockContent::Opaque`] and written back unchanged, so loading and saving a
//! project never loses data. Payload fields a known kind does not use travel in
//! its `extra` map.
//!
//! # Examples
//!
//! ```rust
//! use folio_core::models::{BlockContent, BlockKind, ContentBlock, HeadingLevel};
//!
//! let block = ContentBlock::new(BlockKind::Title);
//! match block.content() {
//!     BlockContent::Title(title) => {
//!         assert_eq!(title.text, "");
//!         assert_eq!(title.level, HeadingLevel::H2);
//!     }
//!     other => panic!("unexpected payload: {:?}", other),
//! }
//! ```

use crate::models::ValidationError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Initial markup of a freshly added paragraph block
pub const DEFAULT_PARAGRAPH_HTML: &str = "<p>Start writing...</p>";

/// Readable tag of a stored block that had no `type` at all
pub const MISSING_TAG_LABEL: &str = "(none)";

/// Generate a fresh block identifier
pub fn new_block_id() -> String {
    Uuid::new_v4().to_string()
}

/// Type tag of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Title,
    Paragraph,
    Image,
    Video,
    Embed,
}

impl BlockKind {
    /// Every block kind, in the order the editor offers them
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Title,
        BlockKind::Paragraph,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Embed,
    ];

    /// Tag string used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Embed => "embed",
        }
    }

    /// Type-correct default payload for a newly added block of this kind
    pub fn default_content(self) -> BlockContent {
        match self {
            BlockKind::Title => BlockContent::Title(TitleContent::default()),
            BlockKind::Paragraph => BlockContent::Paragraph(ParagraphContent::default()),
            BlockKind::Image => BlockContent::Image(ImageContent::default()),
            BlockKind::Video => BlockContent::Video(VideoContent::default()),
            BlockKind::Embed => BlockContent::Embed(EmbedContent::default()),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(BlockKind::Title),
            "paragraph" => Ok(BlockKind::Paragraph),
            "image" => Ok(BlockKind::Image),
            "video" => Ok(BlockKind::Video),
            "embed" => Ok(BlockKind::Embed),
            other => Err(ValidationError::UnknownBlockKind(other.to_string())),
        }
    }
}

/// Heading level of a title block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    #[default]
    H2,
    H3,
}

impl HeadingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }
}

impl FromStr for HeadingLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h1" => Ok(HeadingLevel::H1),
            "h2" => Ok(HeadingLevel::H2),
            "h3" => Ok(HeadingLevel::H3),
            other => Err(ValidationError::UnknownHeadingLevel(other.to_string())),
        }
    }
}

/// Hosting provider of a video block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProvider {
    #[default]
    Youtube,
    Vimeo,
    Other,
}

impl VideoProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoProvider::Youtube => "youtube",
            VideoProvider::Vimeo => "vimeo",
            VideoProvider::Other => "other",
        }
    }
}

impl FromStr for VideoProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(VideoProvider::Youtube),
            "vimeo" => Ok(VideoProvider::Vimeo),
            "other" => Ok(VideoProvider::Other),
            other => Err(ValidationError::UnknownVideoProvider(other.to_string())),
        }
    }
}

/// Payload of a `title` block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TitleContent {
    pub text: String,
    pub level: HeadingLevel,
    /// Fields this build does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `paragraph` block
///
/// `html` is opaque serialized rich text produced by the rich text editor;
/// nothing in this crate interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphContent {
    pub html: String,
    /// Fields this build does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ParagraphContent {
    fn default() -> Self {
        Self {
            html: DEFAULT_PARAGRAPH_HTML.to_string(),
            extra: Map::new(),
        }
    }
}

/// Payload of an `image` block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Fields this build does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `video` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoContent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<VideoProvider>,
    /// Fields this build does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for VideoContent {
    fn default() -> Self {
        Self {
            url: String::new(),
            provider: Some(VideoProvider::Youtube),
            extra: Map::new(),
        }
    }
}

/// Payload of an `embed` block (opaque embeddable markup)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbedContent {
    pub code: String,
    /// Fields this build does not know, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tagged payload of a content block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Title(TitleContent),
    Paragraph(ParagraphContent),
    Image(ImageContent),
    Video(VideoContent),
    Embed(EmbedContent),
    /// Unknown or unusable tag, or a known tag whose payload did not parse.
    /// Kept verbatim.
    Opaque {
        /// Readable tag: the stored string, or the JSON text of any other value
        tag: String,
        /// `type` exactly as stored; `None` when the block had none
        raw_tag: Option<Value>,
        content: Value,
    },
}

impl BlockContent {
    /// Known kind of this payload, `None` for opaque blocks
    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            BlockContent::Title(_) => Some(BlockKind::Title),
            BlockContent::Paragraph(_) => Some(BlockKind::Paragraph),
            BlockContent::Image(_) => Some(BlockKind::Image),
            BlockContent::Video(_) => Some(BlockKind::Video),
            BlockContent::Embed(_) => Some(BlockKind::Embed),
            BlockContent::Opaque { .. } => None,
        }
    }

    /// Wire tag of this payload
    pub fn tag(&self) -> &str {
        match self {
            BlockContent::Opaque { tag, .. } => tag,
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Rebuild a payload from its wire parts
    ///
    /// Never fails: anything that does not parse as a known payload becomes
    /// [`BlockContent::Opaque`].
    pub fn from_parts(tag: &str, content: Value) -> Self {
        let kind = match tag.parse::<BlockKind>() {
            Ok(kind) => kind,
            Err(_) => {
                tracing::debug!("Keeping block with unknown type '{}' as opaque", tag);
                return Self::opaque(tag, content);
            }
        };

        match Self::parse_payload(kind, &content) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    "Payload of '{}' block does not match its type ({}), keeping it as opaque",
                    tag,
                    e
                );
                Self::opaque(tag, content)
            }
        }
    }

    /// Rebuild a payload from a stored `type` of any JSON shape
    ///
    /// Only string tags can name a known kind. A `null`, numeric or missing
    /// tag keeps the block opaque, with the stored value written back as is.
    pub fn from_wire(tag: Option<Value>, content: Value) -> Self {
        match tag {
            Some(Value::String(tag)) => Self::from_parts(&tag, content),
            raw_tag => {
                let label = raw_tag
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_else(|| MISSING_TAG_LABEL.to_string());
                tracing::warn!("Keeping block with unusable type {} as opaque", label);
                BlockContent::Opaque {
                    tag: label,
                    raw_tag,
                    content,
                }
            }
        }
    }

    fn opaque(tag: &str, content: Value) -> Self {
        BlockContent::Opaque {
            tag: tag.to_string(),
            raw_tag: Some(Value::String(tag.to_string())),
            content,
        }
    }

    fn parse_payload(kind: BlockKind, content: &Value) -> serde_json::Result<Self> {
        Ok(match kind {
            BlockKind::Title => BlockContent::Title(TitleContent::deserialize(content)?),
            BlockKind::Paragraph => {
                BlockContent::Paragraph(ParagraphContent::deserialize(content)?)
            }
            BlockKind::Image => BlockContent::Image(ImageContent::deserialize(content)?),
            BlockKind::Video => BlockContent::Video(VideoContent::deserialize(content)?),
            BlockKind::Embed => BlockContent::Embed(EmbedContent::deserialize(content)?),
        })
    }
}

/// A single content block of a project document
///
/// The id is assigned at construction and never changes afterwards; edits
/// replace the content only.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBlock {
    id: String,
    content: BlockContent,
}

impl ContentBlock {
    /// Create a block of the given kind with a fresh id and default payload
    pub fn new(kind: BlockKind) -> Self {
        Self::with_content(kind.default_content())
    }

    /// Create a block with a fresh id around an existing payload
    pub fn with_content(content: BlockContent) -> Self {
        Self {
            id: new_block_id(),
            content,
        }
    }

    /// Rehydrate a block whose id was assigned earlier (e.g. loaded from storage)
    pub fn restore(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &BlockContent {
        &self.content
    }

    pub fn kind(&self) -> Option<BlockKind> {
        self.content.kind()
    }

    pub fn tag(&self) -> &str {
        self.content.tag()
    }

    pub fn into_content(self) -> BlockContent {
        self.content
    }

    pub(crate) fn set_content(&mut self, content: BlockContent) {
        self.content = content;
    }

    /// Copy of this block under a fresh id
    pub(crate) fn duplicate(&self) -> Self {
        Self::with_content(self.content.clone())
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContentBlock", 3)?;
        state.serialize_field("id", &self.id)?;
        match &self.content {
            BlockContent::Opaque {
                raw_tag: Some(raw), ..
            } => state.serialize_field("type", raw)?,
            BlockContent::Opaque { raw_tag: None, .. } => state.skip_field("type")?,
            known => state.serialize_field("type", known.tag())?,
        }
        match &self.content {
            BlockContent::Title(c) => state.serialize_field("content", c)?,
            BlockContent::Paragraph(c) => state.serialize_field("content", c)?,
            BlockContent::Image(c) => state.serialize_field("content", c)?,
            BlockContent::Video(c) => state.serialize_field("content", c)?,
            BlockContent::Embed(c) => state.serialize_field("content", c)?,
            BlockContent::Opaque { content, .. } => state.serialize_field("content", content)?,
        }
        state.end()
    }
}

/// Wire shape shared by every block tag
#[derive(Deserialize)]
struct WireBlock {
    id: String,
    #[serde(rename = "type", default, deserialize_with = "present")]
    tag: Option<Value>,
    #[serde(default)]
    content: Value,
}

/// Keeps an explicit `null` apart from an absent field
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireBlock::deserialize(deserializer)?;
        Ok(ContentBlock {
            content: BlockContent::from_wire(wire.tag, wire.content),
            id: wire.id,
        })
    }
}
