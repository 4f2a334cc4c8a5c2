//! # Campus Records
//!
//! The five resource types served by the API, and the registry wiring
//! each of them to a store.

mod dining_commons_menu_item;
mod help_request;
mod menu_item_review;
mod organization;
mod recommendation_request;

use std::path::Path;
use std::sync::Arc;

pub use dining_commons_menu_item::DiningCommonsMenuItem;
pub use help_request::HelpRequest;
pub use menu_item_review::MenuItemReview;
pub use organization::Organization;
pub use recommendation_request::RecommendationRequest;

use crate::resource::{FileRecordStore, InMemoryRecordStore, RecordStore, StoreResult};

/// One store per resource type
#[derive(Clone)]
pub struct Resources {
    pub help_requests: Arc<dyn RecordStore<HelpRequest>>,
    pub menu_item_reviews: Arc<dyn RecordStore<MenuItemReview>>,
    pub recommendation_requests: Arc<dyn RecordStore<RecommendationRequest>>,
    pub dining_commons_menu_items: Arc<dyn RecordStore<DiningCommonsMenuItem>>,
    pub organizations: Arc<dyn RecordStore<Organization>>,
}

impl Resources {
    /// Volatile stores, emptied on restart
    pub fn in_memory() -> Self {
        Self {
            help_requests: Arc::new(InMemoryRecordStore::new()),
            menu_item_reviews: Arc::new(InMemoryRecordStore::new()),
            recommendation_requests: Arc::new(InMemoryRecordStore::new()),
            dining_commons_menu_items: Arc::new(InMemoryRecordStore::new()),
            organizations: Arc::new(InMemoryRecordStore::new()),
        }
    }

    /// Stores snapshotted as JSON files under `dir`
    pub fn file_backed(dir: &Path) -> StoreResult<Self> {
        Ok(Self {
            help_requests: Arc::new(FileRecordStore::open(dir)?),
            menu_item_reviews: Arc::new(FileRecordStore::open(dir)?),
            recommendation_requests: Arc::new(FileRecordStore::open(dir)?),
            dining_commons_menu_items: Arc::new(FileRecordStore::open(dir)?),
            organizations: Arc::new(FileRecordStore::open(dir)?),
        })
    }
}
