use std::sync::Arc;

use meridian_core::gateway::{DocumentStore, OrderBy, StoreError, MAX_BATCH_SIZE};
use tracing::warn;

use crate::category::{AddOn, RentalCategory};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown add-on id: {0}")]
    UnknownAddOn(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read side of the rental catalog. Categories and add-ons are reference data
/// maintained elsewhere; this reader only queries them.
pub struct CatalogReader {
    store: Arc<dyn DocumentStore>,
    categories_collection: String,
    add_ons_collection: String,
}

impl CatalogReader {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        categories_collection: impl Into<String>,
        add_ons_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            categories_collection: categories_collection.into(),
            add_ons_collection: add_ons_collection.into(),
        }
    }

    /// Categories a customer can book right now, in display order.
    pub async fn bookable_categories(&self) -> Result<Vec<RentalCategory>, CatalogError> {
        let docs = self
            .store
            .query(
                &self.categories_collection,
                None,
                Some(OrderBy::asc("displayOrder")),
                None,
            )
            .await?;

        let mut categories = Vec::with_capacity(docs.len());
        for doc in &docs {
            match serde_json::from_value::<RentalCategory>(doc.data.clone()) {
                Ok(category) => {
                    if category.is_bookable() {
                        categories.push(category);
                    }
                }
                Err(err) => {
                    warn!(collection = %self.categories_collection, id = %doc.id, %err, "skipping unreadable category");
                }
            }
        }
        Ok(categories)
    }

    /// Every add-on currently offered for sale.
    pub async fn active_add_ons(&self) -> Result<Vec<AddOn>, CatalogError> {
        let docs = self
            .store
            .query(&self.add_ons_collection, None, None, None)
            .await?;

        let mut add_ons = Vec::with_capacity(docs.len());
        for doc in &docs {
            match serde_json::from_value::<AddOn>(doc.data.clone()) {
                Ok(mut add_on) => {
                    add_on.id = doc.id.clone();
                    if add_on.is_active {
                        add_ons.push(add_on);
                    }
                }
                Err(err) => {
                    warn!(collection = %self.add_ons_collection, id = %doc.id, %err, "skipping unreadable add-on");
                }
            }
        }
        Ok(add_ons)
    }

    /// Resolves a booking's selected add-on ids, preserving the requested
    /// order. An unknown id is an error so a stale selection cannot silently
    /// drop a line item from the quote.
    pub async fn add_ons_by_ids(&self, ids: &[String]) -> Result<Vec<AddOn>, CatalogError> {
        let mut found: Vec<AddOn> = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_BATCH_SIZE) {
            let docs = self
                .store
                .batch_get_by_ids(&self.add_ons_collection, chunk)
                .await?;
            for doc in &docs {
                let mut add_on: AddOn = serde_json::from_value(doc.data.clone())
                    .map_err(|err| StoreError::Malformed {
                        collection: self.add_ons_collection.clone(),
                        id: doc.id.clone(),
                        reason: err.to_string(),
                    })?;
                add_on.id = doc.id.clone();
                found.push(add_on);
            }
        }

        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            let add_on = found
                .iter()
                .find(|a| &a.id == id)
                .ok_or_else(|| CatalogError::UnknownAddOn(id.clone()))?;
            resolved.push(add_on.clone());
        }
        Ok(resolved)
    }
}
