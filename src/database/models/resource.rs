use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::services::titles::TitleResolver;
use crate::validation::{Payload, ValidationError};

/// Fields every stored resource carries regardless of kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    pub id: u64,
    pub owner_id: u64,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceMeta {
    pub fn new(id: u64, owner_id: u64, tags: Vec<String>, favorite: bool, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            tags,
            favorite,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance `updated_at`. It moves strictly forward even if the clock has not.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// `wanted` must already be lower-cased.
    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        self.tags
            .iter()
            .any(|tag| wanted.contains(&tag.to_lowercase()))
    }
}

/// A resource kind the repository can store.
///
/// Each kind supplies its own validation rules for the mutable fields, the
/// text it exposes to substring search, and how a full replacement is applied.
#[async_trait]
pub trait Resource: Clone + Serialize + Send + Sync + 'static {
    /// Validated kind-specific fields from a create or update payload
    type Fields: Send + 'static;

    /// Name used in client-facing messages, e.g. "Note not found."
    const LABEL: &'static str;

    fn parse_fields(payload: &Payload) -> Result<Self::Fields, ValidationError>;

    /// Fill in anything derived from remote lookups. Must not fail.
    async fn resolve_fields(fields: Self::Fields, titles: &dyn TitleResolver) -> Self::Fields;

    fn from_parts(meta: ResourceMeta, fields: Self::Fields) -> Self;

    fn replace_fields(&mut self, fields: Self::Fields);

    fn meta(&self) -> &ResourceMeta;

    fn meta_mut(&mut self) -> &mut ResourceMeta;

    /// `needle` must already be lower-cased.
    fn matches_text(&self, needle: &str) -> bool;
}
