use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::database::models::{Resource, ResourceMeta};
use crate::filter::ResourceFilter;
use crate::services::titles::TitleResolver;
use crate::validation::{as_object, optional_bool, tag_list, ValidationError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Also returned for resources owned by someone else
    #[error("{0} not found.")]
    NotFound(&'static str),
}

/// A validated create/update payload
struct Draft<T: Resource> {
    fields: T::Fields,
    tags: Vec<String>,
    favorite: Option<bool>,
}

impl<T: Resource> Draft<T> {
    /// Kind fields are checked before tags so the first reported problem
    /// is the required field.
    fn parse(payload: &Value) -> Result<Self, ValidationError> {
        let payload = as_object(payload)?;
        let fields = T::parse_fields(payload)?;
        let tags = tag_list(payload)?;
        let favorite = optional_bool(payload, "favorite");
        Ok(Self {
            fields,
            tags,
            favorite,
        })
    }
}

struct Collection<T> {
    next_id: u64,
    items: BTreeMap<u64, T>,
    by_owner: HashMap<u64, BTreeSet<u64>>,
}

impl<T: Resource> Collection<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            items: BTreeMap::new(),
            by_owner: HashMap::new(),
        }
    }

    fn owned(&self, owner_id: u64, id: u64) -> Option<&T> {
        self.items
            .get(&id)
            .filter(|r| r.meta().owner_id == owner_id)
    }

    fn owned_mut(&mut self, owner_id: u64, id: u64) -> Option<&mut T> {
        self.items
            .get_mut(&id)
            .filter(|r| r.meta().owner_id == owner_id)
    }
}

/// In-memory store for one resource kind.
///
/// Ids come from a per-kind counter that only moves forward, so a deleted id is
/// never handed out again. Every read and write goes through the owner id; a
/// resource owned by someone else is reported exactly like a missing one.
pub struct Repository<T: Resource> {
    collection: RwLock<Collection<T>>,
    titles: Arc<dyn TitleResolver>,
}

impl<T: Resource> Repository<T> {
    pub fn new(titles: Arc<dyn TitleResolver>) -> Self {
        Self {
            collection: RwLock::new(Collection::new()),
            titles,
        }
    }

    pub async fn create(&self, owner_id: u64, payload: &Value) -> Result<T, RepositoryError> {
        let draft = Draft::<T>::parse(payload)?;
        // Resolved before taking the lock; this may wait on the network
        let fields = T::resolve_fields(draft.fields, self.titles.as_ref()).await;

        let mut collection = self.collection.write().await;
        let id = collection.next_id;
        collection.next_id += 1;

        let meta = ResourceMeta::new(
            id,
            owner_id,
            draft.tags,
            draft.favorite.unwrap_or(false),
            Utc::now(),
        );
        let resource = T::from_parts(meta, fields);
        collection.items.insert(id, resource.clone());
        collection.by_owner.entry(owner_id).or_default().insert(id);

        tracing::debug!("Created {} {} for user {}", T::LABEL, id, owner_id);
        Ok(resource)
    }

    /// The owner's resources in ascending id order, narrowed by `filter`
    pub async fn list(&self, owner_id: u64, filter: &ResourceFilter) -> Vec<T> {
        let collection = self.collection.read().await;
        let Some(ids) = collection.by_owner.get(&owner_id) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| collection.items.get(id))
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect()
    }

    pub async fn get(&self, owner_id: u64, id: u64) -> Result<T, RepositoryError> {
        self.collection
            .read()
            .await
            .owned(owner_id, id)
            .cloned()
            .ok_or(RepositoryError::NotFound(T::LABEL))
    }

    /// Full replacement of the mutable fields. `favorite` changes only when the
    /// payload carries a boolean.
    pub async fn update(&self, owner_id: u64, id: u64, payload: &Value) -> Result<T, RepositoryError> {
        if self.collection.read().await.owned(owner_id, id).is_none() {
            return Err(RepositoryError::NotFound(T::LABEL));
        }

        let draft = Draft::<T>::parse(payload)?;
        let fields = T::resolve_fields(draft.fields, self.titles.as_ref()).await;

        // The resource may have been deleted while the title was resolving
        let mut collection = self.collection.write().await;
        let resource = collection
            .owned_mut(owner_id, id)
            .ok_or(RepositoryError::NotFound(T::LABEL))?;

        resource.replace_fields(fields);
        let meta = resource.meta_mut();
        meta.tags = draft.tags;
        if let Some(favorite) = draft.favorite {
            meta.favorite = favorite;
        }
        meta.touch(Utc::now());

        tracing::debug!("Updated {} {} for user {}", T::LABEL, id, owner_id);
        Ok(resource.clone())
    }

    pub async fn delete(&self, owner_id: u64, id: u64) -> Result<(), RepositoryError> {
        let mut collection = self.collection.write().await;
        if collection.owned(owner_id, id).is_none() {
            return Err(RepositoryError::NotFound(T::LABEL));
        }

        collection.items.remove(&id);
        if let Some(ids) = collection.by_owner.get_mut(&owner_id) {
            ids.remove(&id);
            if ids.is_empty() {
                collection.by_owner.remove(&owner_id);
            }
        }

        tracing::debug!("Deleted {} {} for user {}", T::LABEL, id, owner_id);
        Ok(())
    }

    pub async fn toggle_favorite(&self, owner_id: u64, id: u64) -> Result<T, RepositoryError> {
        let mut collection = self.collection.write().await;
        let resource = collection
            .owned_mut(owner_id, id)
            .ok_or(RepositoryError::NotFound(T::LABEL))?;

        let meta = resource.meta_mut();
        meta.favorite = !meta.favorite;
        meta.touch(Utc::now());

        Ok(resource.clone())
    }
}
