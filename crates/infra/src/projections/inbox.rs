//! Contact inbox read model (tenant back office).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_core::TenantId;
use vidaplena_events::EventEnvelope;
use vidaplena_messages::{ContactEvent, ContactThreadId};

use crate::projections::{ProjectionError, SequenceCursors};
use crate::read_model::TenantStore;

pub const CONTACT_AGGREGATE: &str = "messages.contact";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub thread_id: ContactThreadId,
    pub values: BTreeMap<String, String>,
    pub read: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InboxProjection<S>
where
    S: TenantStore<ContactThreadId, InboxEntry>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> InboxProjection<S>
where
    S: TenantStore<ContactThreadId, InboxEntry>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    pub fn get(&self, tenant_id: TenantId, thread_id: &ContactThreadId) -> Option<InboxEntry> {
        self.store.get(tenant_id, thread_id)
    }

    /// All submissions for a tenant, newest first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<InboxEntry> {
        let mut entries = self.store.list(tenant_id);
        entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        entries
    }

    pub fn unread_count(&self, tenant_id: TenantId) -> usize {
        self.store
            .list(tenant_id)
            .iter()
            .filter(|e| !e.read)
            .count()
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != CONTACT_AGGREGATE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: ContactEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let (event_tenant, thread_id) = match &ev {
            ContactEvent::ContactSubmitted(e) => (e.tenant_id, e.thread_id),
            ContactEvent::ThreadMarkedRead(e) => (e.tenant_id, e.thread_id),
        };
        if event_tenant != tenant_id {
            return Err(ProjectionError::TenantIsolation(
                "event tenant_id does not match envelope tenant_id".to_string(),
            ));
        }
        if thread_id.0 != aggregate_id {
            return Err(ProjectionError::TenantIsolation(
                "event thread_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match ev {
            ContactEvent::ContactSubmitted(e) => {
                self.store.upsert(
                    tenant_id,
                    e.thread_id,
                    InboxEntry {
                        thread_id: e.thread_id,
                        values: e.values,
                        read: false,
                        submitted_at: e.occurred_at,
                    },
                );
            }
            ContactEvent::ThreadMarkedRead(e) => {
                if let Some(mut entry) = self.store.get(tenant_id, &e.thread_id) {
                    entry.read = true;
                    self.store.upsert(tenant_id, e.thread_id, entry);
                }
            }
        }

        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }
}
