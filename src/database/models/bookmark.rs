use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use super::resource::{Resource, ResourceMeta};
use crate::services::titles::TitleResolver;
use crate::validation::{optional_string, required_string, Payload, ValidationError};

const INVALID_URL: &str = "A valid URL is required.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bookmark {
    #[serde(flatten)]
    pub meta: ResourceMeta,
    pub url: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkFields {
    pub url: String,
    /// `None` until resolved; an empty supplied title counts as absent.
    pub title: Option<String>,
    pub description: String,
}

#[async_trait]
impl Resource for Bookmark {
    type Fields = BookmarkFields;

    const LABEL: &'static str = "Bookmark";

    fn parse_fields(payload: &Payload) -> Result<BookmarkFields, ValidationError> {
        let url = required_string(payload, "url", INVALID_URL)?;
        Url::parse(url).map_err(|_| ValidationError::field("url", INVALID_URL))?;

        let title = optional_string(payload, "title")?
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let description = optional_string(payload, "description")?
            .unwrap_or_default()
            .to_string();

        Ok(BookmarkFields {
            url: url.to_string(),
            title,
            description,
        })
    }

    async fn resolve_fields(fields: BookmarkFields, titles: &dyn TitleResolver) -> BookmarkFields {
        if fields.title.is_some() {
            return fields;
        }

        let resolved = titles.resolve(&fields.url).await;
        let title = if resolved.is_empty() {
            fields.url.clone()
        } else {
            resolved
        };

        BookmarkFields {
            title: Some(title),
            ..fields
        }
    }

    fn from_parts(meta: ResourceMeta, fields: BookmarkFields) -> Self {
        let title = fields.title.unwrap_or_else(|| fields.url.clone());
        Self {
            meta,
            url: fields.url,
            title,
            description: fields.description,
        }
    }

    fn replace_fields(&mut self, fields: BookmarkFields) {
        self.title = fields.title.unwrap_or_else(|| fields.url.clone());
        self.url = fields.url;
        self.description = fields.description;
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}
