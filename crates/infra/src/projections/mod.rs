//! Read-model projections.
//!
//! Each projection consumes bus envelopes and maintains a disposable,
//! tenant-scoped read model in a [`TenantStore`](crate::read_model::TenantStore).
//! The bus is at-least-once, so every projection tracks a per-stream
//! sequence cursor: duplicates are skipped, gaps are an error (a gap means
//! the projection missed an event and must be rebuilt).

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use vidaplena_core::{AggregateId, TenantId};

pub mod businesses;
pub mod inbox;
pub mod landing;
pub mod orders;
pub mod payments;
pub mod public_catalog;
pub mod users;

pub use businesses::{BusinessDirectoryProjection, BusinessReadModel};
pub use inbox::{InboxEntry, InboxProjection};
pub use landing::{LandingDocKey, PublicLandingDoc, PublicLandingProjection};
pub use orders::{OrderReadModel, OrdersProjection};
pub use payments::{PaymentSettingsProjection, PaymentsDocKey};
pub use public_catalog::{CatalogDocKey, PublicCatalogDoc, PublicCatalogProjection, PublicProduct};
pub use users::{UserDirectoryProjection, UserReadModel};

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("failed to deserialize event payload: {0}")]
    Deserialize(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },
}

/// Per-stream sequence cursors shared by all projections.
#[derive(Debug, Default)]
pub(crate) struct SequenceCursors {
    inner: RwLock<HashMap<(TenantId, AggregateId), u64>>,
}

impl SequenceCursors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decide whether an envelope at `seq` should be applied.
    ///
    /// `Ok(false)` means a duplicate delivery, skip silently. An error means
    /// a gap; the caller should surface it so the projection gets rebuilt.
    pub(crate) fn check(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        seq: u64,
    ) -> Result<bool, ProjectionError> {
        let last = match self.inner.read() {
            Ok(map) => *map.get(&(tenant_id, aggregate_id)).unwrap_or(&0),
            Err(_) => 0,
        };

        if seq == 0 {
            return Err(ProjectionError::NonMonotonicSequence { last, found: seq });
        }
        if seq <= last {
            return Ok(false);
        }
        if last != 0 && seq != last + 1 {
            return Err(ProjectionError::NonMonotonicSequence { last, found: seq });
        }
        Ok(true)
    }

    /// Record that the event at `seq` was applied.
    pub(crate) fn commit(&self, tenant_id: TenantId, aggregate_id: AggregateId, seq: u64) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, aggregate_id), seq);
        }
    }

    pub(crate) fn clear_tenant(&self, tenant_id: TenantId) {
        if let Ok(mut map) = self.inner.write() {
            map.retain(|(t, _), _| *t != tenant_id);
        }
    }
}

/// Sort envelopes into deterministic replay order and collect the tenants
/// they touch. Shared by the `rebuild_from_scratch` paths.
pub(crate) fn replay_order(
    envelopes: impl IntoIterator<Item = vidaplena_events::EventEnvelope<serde_json::Value>>,
) -> (
    Vec<TenantId>,
    Vec<vidaplena_events::EventEnvelope<serde_json::Value>>,
) {
    let mut envs: Vec<_> = envelopes.into_iter().collect();

    let mut tenants: Vec<_> = envs.iter().map(|e| e.tenant_id()).collect();
    tenants.sort_by_key(|t| *t.as_uuid().as_bytes());
    tenants.dedup();

    envs.sort_by_key(|e| {
        (
            *e.tenant_id().as_uuid().as_bytes(),
            *e.aggregate_id().as_uuid().as_bytes(),
            e.sequence_number(),
        )
    });

    (tenants, envs)
}
