//! Public catalog projection.
//!
//! Maintains **one denormalized document per tenant**: the full product
//! list plus the landing header, exactly what the public catalog endpoint
//! serves. The document is rebuilt wholesale after every applied event
//! (full replace, O(products) per edit), so it never contains stale
//! entries; deleted products drop out on the projection cycle, not
//! synchronously with the command.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_catalog::{ProductEvent, ProductId};
use vidaplena_core::TenantId;
use vidaplena_events::EventEnvelope;
use vidaplena_storefront::{HeaderConfig, LandingEvent};

use crate::projections::{ProjectionError, SequenceCursors, replay_order};
use crate::read_model::TenantStore;

pub const PRODUCT_AGGREGATE: &str = "catalog.product";
pub const LANDING_AGGREGATE: &str = "storefront.landing";

/// Singleton key for the per-tenant catalog document.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct CatalogDocKey;

/// Product entry as served publicly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProduct {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: i64,
    pub category: String,
    pub images: Vec<String>,
    pub rating_count: u64,
    pub average_rating: f64,
}

/// The per-tenant public catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicCatalogDoc {
    pub products: Vec<PublicProduct>,
    pub header: Option<HeaderConfig>,
}

/// Working product state (keeps the exact rating integers; the float
/// average only exists in the published document).
#[derive(Debug, Clone)]
struct ProductCells {
    name: String,
    description: String,
    price: u64,
    stock: i64,
    category: String,
    images: Vec<String>,
    rating_sum: u64,
    rating_count: u64,
}

#[derive(Debug)]
pub struct PublicCatalogProjection<S>
where
    S: TenantStore<CatalogDocKey, PublicCatalogDoc>,
{
    store: S,
    cursors: SequenceCursors,
    products: RwLock<HashMap<(TenantId, ProductId), ProductCells>>,
    headers: RwLock<HashMap<TenantId, HeaderConfig>>,
}

impl<S> PublicCatalogProjection<S>
where
    S: TenantStore<CatalogDocKey, PublicCatalogDoc>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
            products: RwLock::new(HashMap::new()),
            headers: RwLock::new(HashMap::new()),
        }
    }

    /// The projected document for a tenant; `None` until the tenant has any
    /// catalog activity.
    pub fn document(&self, tenant_id: TenantId) -> Option<PublicCatalogDoc> {
        self.store.get(tenant_id, &CatalogDocKey)
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        match envelope.aggregate_type() {
            PRODUCT_AGGREGATE => self.apply_product(envelope),
            LANDING_AGGREGATE => self.apply_landing(envelope),
            _ => Ok(()),
        }
    }

    fn apply_product(&self, envelope: &EventEnvelope<JsonValue>) -> Result<(), ProjectionError> {
        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: ProductEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let (event_tenant, product_id) = match &ev {
            ProductEvent::ProductCreated(e) => (e.tenant_id, e.product_id),
            ProductEvent::ProductUpdated(e) => (e.tenant_id, e.product_id),
            ProductEvent::ProductDeleted(e) => (e.tenant_id, e.product_id),
            ProductEvent::ProductRated(e) => (e.tenant_id, e.product_id),
        };
        if event_tenant != tenant_id {
            return Err(ProjectionError::TenantIsolation(
                "event tenant_id does not match envelope tenant_id".to_string(),
            ));
        }
        if product_id.0 != aggregate_id {
            return Err(ProjectionError::TenantIsolation(
                "event product_id does not match envelope aggregate_id".to_string(),
            ));
        }

        {
            let mut products = match self.products.write() {
                Ok(p) => p,
                Err(_) => return Ok(()),
            };
            let key = (tenant_id, product_id);
            match ev {
                ProductEvent::ProductCreated(e) => {
                    products.insert(
                        key,
                        ProductCells {
                            name: e.name,
                            description: e.description,
                            price: e.price,
                            stock: e.stock,
                            category: e.category,
                            images: e.images,
                            rating_sum: 0,
                            rating_count: 0,
                        },
                    );
                }
                ProductEvent::ProductUpdated(e) => {
                    if let Some(cells) = products.get_mut(&key) {
                        if let Some(name) = e.name {
                            cells.name = name;
                        }
                        if let Some(description) = e.description {
                            cells.description = description;
                        }
                        if let Some(price) = e.price {
                            cells.price = price;
                        }
                        if let Some(stock) = e.stock {
                            cells.stock = stock;
                        }
                        if let Some(category) = e.category {
                            cells.category = category;
                        }
                        if let Some(images) = e.images {
                            cells.images = images;
                        }
                    }
                }
                ProductEvent::ProductDeleted(_) => {
                    products.remove(&key);
                }
                ProductEvent::ProductRated(e) => {
                    if let Some(cells) = products.get_mut(&key) {
                        cells.rating_sum += u64::from(e.rating);
                        cells.rating_count += 1;
                    }
                }
            }
        }

        self.publish_document(tenant_id);
        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }

    fn apply_landing(&self, envelope: &EventEnvelope<JsonValue>) -> Result<(), ProjectionError> {
        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: LandingEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        // Only the header flows into the catalog document; the form schema
        // belongs to the landing projection.
        if let LandingEvent::HeaderSet(e) = ev {
            if e.tenant_id != tenant_id {
                return Err(ProjectionError::TenantIsolation(
                    "event tenant_id does not match envelope tenant_id".to_string(),
                ));
            }
            if let Ok(mut headers) = self.headers.write() {
                headers.insert(tenant_id, e.header);
            }
            self.publish_document(tenant_id);
        }

        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }

    /// Full replace: assemble the document from scratch and overwrite.
    fn publish_document(&self, tenant_id: TenantId) {
        let mut products: Vec<PublicProduct> = match self.products.read() {
            Ok(map) => map
                .iter()
                .filter(|((t, _), _)| *t == tenant_id)
                .map(|((_, product_id), cells)| PublicProduct {
                    product_id: *product_id,
                    name: cells.name.clone(),
                    description: cells.description.clone(),
                    price: cells.price,
                    stock: cells.stock,
                    category: cells.category.clone(),
                    images: cells.images.clone(),
                    rating_count: cells.rating_count,
                    average_rating: if cells.rating_count == 0 {
                        0.0
                    } else {
                        cells.rating_sum as f64 / cells.rating_count as f64
                    },
                })
                .collect(),
            Err(_) => return,
        };

        // UUIDv7 ids are time-ordered, so this is creation order.
        products.sort_by_key(|p| *p.product_id.0.as_uuid().as_bytes());

        let header = self
            .headers
            .read()
            .ok()
            .and_then(|h| h.get(&tenant_id).cloned());

        self.store
            .upsert(tenant_id, CatalogDocKey, PublicCatalogDoc { products, header });
    }

    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), ProjectionError> {
        let (tenants, envs) = replay_order(envelopes);

        for t in tenants {
            self.store.clear_tenant(t);
            self.cursors.clear_tenant(t);
            if let Ok(mut products) = self.products.write() {
                products.retain(|(pt, _), _| *pt != t);
            }
            if let Ok(mut headers) = self.headers.write() {
                headers.remove(&t);
            }
        }

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}
