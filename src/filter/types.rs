use serde::Deserialize;

/// Query string accepted by the list endpoints: `?q=milk&tags=work,home`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub tags: Option<String>,
}

impl ListQuery {
    /// Build from raw `key=value` pairs. A repeated key keeps its first value
    /// and unknown keys are ignored, so a list request never fails on its
    /// query string.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut query.q,
                "tags" => &mut query.tags,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}
