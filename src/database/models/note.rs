use async_trait::async_trait;
use serde::Serialize;

use super::resource::{Resource, ResourceMeta};
use crate::services::titles::TitleResolver;
use crate::validation::{required_string, Payload, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    #[serde(flatten)]
    pub meta: ResourceMeta,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteFields {
    pub content: String,
}

#[async_trait]
impl Resource for Note {
    type Fields = NoteFields;

    const LABEL: &'static str = "Note";

    fn parse_fields(payload: &Payload) -> Result<NoteFields, ValidationError> {
        let content = required_string(payload, "content", "Note content is required.")?;
        Ok(NoteFields {
            content: content.to_string(),
        })
    }

    async fn resolve_fields(fields: NoteFields, _titles: &dyn TitleResolver) -> NoteFields {
        fields
    }

    fn from_parts(meta: ResourceMeta, fields: NoteFields) -> Self {
        Self {
            meta,
            content: fields.content,
        }
    }

    fn replace_fields(&mut self, fields: NoteFields) {
        self.content = fields.content;
    }

    fn meta(&self) -> &ResourceMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ResourceMeta {
        &mut self.meta
    }

    fn matches_text(&self, needle: &str) -> bool {
        self.content.to_lowercase().contains(needle)
    }
}
