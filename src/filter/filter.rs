use crate::database::models::Resource;

use super::types::ListQuery;

/// Text and tag criteria applied to a single owner's resources.
///
/// Both criteria are stored lower-cased. An absent or empty criterion matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    text: Option<String>,
    tags: Option<Vec<String>>,
}

impl ResourceFilter {
    pub fn new(text: Option<&str>, tags: Option<&str>) -> Self {
        let text = text
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let tags = tags
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|tags| !tags.is_empty());

        Self { text, tags }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.tags.is_none()
    }

    pub fn matches<T: Resource>(&self, resource: &T) -> bool {
        if self.is_empty() {
            return true;
        }
        if let Some(text) = &self.text {
            if !resource.matches_text(text) {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !resource.meta().has_any_tag(tags) {
                return false;
            }
        }
        true
    }
}

impl From<&ListQuery> for ResourceFilter {
    fn from(query: &ListQuery) -> Self {
        Self::new(query.q.as_deref(), query.tags.as_deref())
    }
}
