//! Generic CRUD page lifecycle
//!
//! load → (save | delete) → full reload. Nothing is updated optimistically:
//! the list only changes when a reload succeeds.

use crate::api_client::ApiClient;
use crate::notice::Notice;
use crate::resources::ResourceService;
use llama_core::forms::{self, LESSON_POINTS_CAP};
use llama_core::types::Question;
use llama_core::EntityId;

/// Drives one resource page
#[derive(Debug)]
pub struct CrudController<R: ResourceService> {
    service: R,
    api: ApiClient,
    records: Vec<R::Record>,
    loaded: bool,
}

impl<R: ResourceService> CrudController<R> {
    /// Create a controller; nothing is fetched until [`Self::load`]
    #[must_use]
    pub const fn new(service: R, api: ApiClient) -> Self {
        Self {
            service,
            api,
            records: Vec::new(),
            loaded: false,
        }
    }

    /// The resource service
    #[must_use]
    pub const fn service(&self) -> &R {
        &self.service
    }

    /// Records from the last successful load
    #[must_use]
    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    /// Whether a load has succeeded at least once
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a loaded record
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<&R::Record> {
        self.records.iter().find(|record| R::record_id(record) == id)
    }

    /// Fetch the list
    ///
    /// On failure the previous records stay and an error notice is returned.
    pub async fn load(&mut self) -> Option<Notice> {
        let kind = self.service.kind();
        match self.service.list(&self.api).await {
            Ok(records) => {
                tracing::debug!(resource = %kind, count = records.len(), "list loaded");
                self.records = records;
                self.loaded = true;
                None
            }
            Err(err) => {
                tracing::error!(resource = %kind, error = %err, "failed to load list");
                Some(Notice::load_failed(kind))
            }
        }
    }

    /// Create (`editing == None`) or update a record, then reload
    pub async fn save(&mut self, editing: Option<EntityId>, draft: &R::Draft) -> Notice {
        let kind = self.service.kind();
        let result = match editing {
            Some(id) => self.service.update(&self.api, id, draft).await,
            None => self.service.create(&self.api, draft).await,
        };

        match result {
            Ok(()) => {
                tracing::info!(resource = %kind, id = ?editing, "record saved");
                if let Some(notice) = self.load().await {
                    return notice;
                }
                Notice::saved(kind, editing.is_none())
            }
            Err(err) => {
                tracing::warn!(resource = %kind, error = %err, "save failed");
                Notice::save_failed(&err)
            }
        }
    }

    /// Delete a record after `confirm` agrees, then reload
    ///
    /// Returns `None` when the user declines.
    pub async fn delete(&mut self, id: EntityId, confirm: impl FnOnce() -> bool + Send) -> Option<Notice> {
        if !confirm() {
            tracing::debug!(id, "delete declined");
            return None;
        }

        let kind = self.service.kind();
        match self.service.delete(&self.api, id).await {
            Ok(()) => {
                tracing::info!(resource = %kind, id, "record deleted");
                if let Some(notice) = self.load().await {
                    return Some(notice);
                }
                Some(Notice::deleted(kind))
            }
            Err(err) => {
                tracing::warn!(resource = %kind, id, error = %err, "delete failed");
                Some(Notice::delete_failed(kind, &err))
            }
        }
    }
}

/// Warning shown before saving a question that pushes its lesson past the point cap
#[must_use]
pub fn question_points_warning(
    questions: &[Question],
    editing: Option<EntityId>,
    points: i64,
) -> Option<Notice> {
    let check = forms::check_points(questions, editing, points);
    check.exceeds_cap.then(|| {
        Notice::warning(format!(
            "The lesson would total {} points, above the recommended {LESSON_POINTS_CAP}",
            check.total
        ))
    })
}
