use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use url::Url;

use crate::course::required;
use crate::error::{ModelError, Result};
use crate::ids::{ContentId, ModuleId, UserId};
use crate::position::Position;

/// URL prefix under which uploaded image and file references are served.
pub const MEDIA_URL_PREFIX: &str = "/media/";

/// The closed set of content kinds a module may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ContentKind {
    Text,
    Video,
    Image,
    File,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Text,
        ContentKind::Video,
        ContentKind::Image,
        ContentKind::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Video => "video",
            ContentKind::Image => "image",
            ContentKind::File => "file",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnsupportedContentKind(s.to_string()))
    }
}

/// Fields shared by every content item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMeta {
    pub title: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub meta: ItemMeta,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub meta: ItemMeta,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub meta: ItemMeta,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileItem {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub meta: ItemMeta,
    pub file: String,
}

/// Polymorphic payload of a content slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum ContentItem {
    Text(TextItem),
    Video(VideoItem),
    Image(ImageItem),
    File(FileItem),
}

/// Raw item fields as submitted by an author. Which fields are required
/// depends on the [`ContentKind`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemFields {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub content: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub file: Option<String>,
}

impl ContentItem {
    pub fn build(kind: ContentKind, owner: UserId, fields: ItemFields) -> Result<Self> {
        let now = Utc::now();
        let meta = ItemMeta {
            title: required("title", fields.title)?,
            owner,
            created_at: now,
            updated_at: now,
        };
        Ok(match kind {
            ContentKind::Text => ContentItem::Text(TextItem {
                meta,
                content: field("content", fields.content)?,
            }),
            ContentKind::Video => ContentItem::Video(VideoItem {
                meta,
                url: video_url(field("url", fields.url)?)?,
            }),
            ContentKind::Image => ContentItem::Image(ImageItem {
                meta,
                file: file_reference(field("file", fields.file)?)?,
            }),
            ContentKind::File => ContentItem::File(FileItem {
                meta,
                file: file_reference(field("file", fields.file)?)?,
            }),
        })
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Text(_) => ContentKind::Text,
            ContentItem::Video(_) => ContentKind::Video,
            ContentItem::Image(_) => ContentKind::Image,
            ContentItem::File(_) => ContentKind::File,
        }
    }

    pub fn meta(&self) -> &ItemMeta {
        match self {
            ContentItem::Text(item) => &item.meta,
            ContentItem::Video(item) => &item.meta,
            ContentItem::Image(item) => &item.meta,
            ContentItem::File(item) => &item.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut ItemMeta {
        match self {
            ContentItem::Text(item) => &mut item.meta,
            ContentItem::Video(item) => &mut item.meta,
            ContentItem::Image(item) => &mut item.meta,
            ContentItem::File(item) => &mut item.meta,
        }
    }

    pub fn title(&self) -> &str {
        &self.meta().title
    }

    pub fn owner(&self) -> UserId {
        self.meta().owner
    }

    /// Replace the editable fields. The kind of an item never changes; fields
    /// not relevant to it are ignored.
    pub fn apply(&mut self, fields: ItemFields) -> Result<()> {
        let title = required("title", fields.title)?;
        match self {
            ContentItem::Text(item) => {
                item.content = field("content", fields.content)?;
            }
            ContentItem::Video(item) => {
                item.url = video_url(field("url", fields.url)?)?;
            }
            ContentItem::Image(item) => {
                item.file = file_reference(field("file", fields.file)?)?;
            }
            ContentItem::File(item) => {
                item.file = file_reference(field("file", fields.file)?)?;
            }
        }
        let meta = self.meta_mut();
        meta.title = title;
        meta.updated_at = Utc::now();
        Ok(())
    }

    /// HTML fragment shown to students for this item.
    pub fn render(&self) -> String {
        match self {
            ContentItem::Text(item) => {
                let paragraphs = item
                    .content
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
                    .collect::<String>();
                format!(
                    r#"<div class="content-text"><h3>{}</h3>{}</div>"#,
                    escape_html(&item.meta.title),
                    paragraphs
                )
            }
            ContentItem::Video(item) => format!(
                r#"<div class="content-video"><h3>{title}</h3><a href="{url}">{title}</a></div>"#,
                title = escape_html(&item.meta.title),
                url = escape_html(&item.url),
            ),
            ContentItem::Image(item) => format!(
                r#"<div class="content-image"><img src="{MEDIA_URL_PREFIX}{}" alt="{}"></div>"#,
                escape_html(&item.file),
                escape_html(&item.meta.title),
            ),
            ContentItem::File(item) => format!(
                r#"<div class="content-file"><a href="{MEDIA_URL_PREFIX}{}" download>{}</a></div>"#,
                escape_html(&item.file),
                escape_html(&item.meta.title),
            ),
        }
    }
}

/// A content slot: ordered position of one item inside a module.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Content {
    pub id: ContentId,
    pub module_id: ModuleId,
    pub position: Option<Position>,
    pub item: ContentItem,
    pub created_at: DateTime<Utc>,
}

impl Content {
    pub fn new(module_id: ModuleId, item: ContentItem) -> Self {
        Self {
            id: ContentId::new(),
            module_id,
            position: None,
            item,
            created_at: Utc::now(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

fn field(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ModelError::validation(format!("{name} is required"))),
    }
}

fn video_url(raw: String) -> Result<String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| ModelError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ModelError::InvalidUrl(format!(
            "unsupported scheme {other:?}"
        ))),
    }
}

fn file_reference(raw: String) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(ModelError::validation(
            "file reference must not traverse upwards",
        ));
    }
    Ok(trimmed.to_string())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> ItemFields {
        ItemFields {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Video".parse::<ContentKind>().unwrap(), ContentKind::Video);
        assert!(matches!(
            "audio".parse::<ContentKind>(),
            Err(ModelError::UnsupportedContentKind(_))
        ));
    }

    #[test]
    fn text_requires_content() {
        let err = ContentItem::build(ContentKind::Text, UserId::new(), fields("Intro"));
        assert!(err.is_err());
    }

    #[test]
    fn video_rejects_non_http_scheme() {
        let mut f = fields("Lecture");
        f.url = Some("ftp://example.com/a.mp4".into());
        assert!(matches!(
            ContentItem::build(ContentKind::Video, UserId::new(), f),
            Err(ModelError::InvalidUrl(_))
        ));
    }

    #[test]
    fn render_escapes_markup() {
        let mut f = fields("<b>Intro</b>");
        f.content = Some("a & b\n\nsecond".into());
        let item = ContentItem::build(ContentKind::Text, UserId::new(), f).unwrap();
        let html = item.render();
        assert!(html.contains("&lt;b&gt;Intro&lt;/b&gt;"));
        assert!(html.contains("<p>a &amp; b</p><p>second</p>"));
    }

    #[test]
    fn file_render_uses_media_prefix() {
        let mut f = fields("Slides");
        f.file = Some("/files/slides.pdf".into());
        let item = ContentItem::build(ContentKind::File, UserId::new(), f).unwrap();
        assert!(item.render().contains(r#"href="/media/files/slides.pdf""#));
    }

    #[test]
    fn apply_keeps_kind_and_owner() {
        let owner = UserId::new();
        let mut f = fields("Clip");
        f.url = Some("https://example.com/v".into());
        let mut item = ContentItem::build(ContentKind::Video, owner, f.clone()).unwrap();
        f.title = "Clip v2".into();
        item.apply(f).unwrap();
        assert_eq!(item.kind(), ContentKind::Video);
        assert_eq!(item.owner(), owner);
        assert_eq!(item.title(), "Clip v2");
    }

    #[test]
    fn traversal_in_file_reference_is_rejected() {
        let mut f = fields("Secrets");
        f.file = Some("images/../../etc/passwd".into());
        assert!(ContentItem::build(ContentKind::Image, UserId::new(), f).is_err());
    }
}
