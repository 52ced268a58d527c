//! Business directory read model (platform admin).
//!
//! Directory streams live under the reserved platform tenant
//! (`TenantId::platform()`); the read model is keyed by each business's own
//! tenant id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_core::TenantId;
use vidaplena_directory::BusinessEvent;
use vidaplena_events::EventEnvelope;

use crate::projections::{ProjectionError, SequenceCursors};
use crate::read_model::TenantStore;

pub const BUSINESS_AGGREGATE: &str = "directory.business";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessReadModel {
    pub business_id: TenantId,
    pub name: String,
    pub slug: String,
    pub suspended: bool,
    pub modules: BTreeMap<String, bool>,
}

#[derive(Debug)]
pub struct BusinessDirectoryProjection<S>
where
    S: TenantStore<TenantId, BusinessReadModel>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> BusinessDirectoryProjection<S>
where
    S: TenantStore<TenantId, BusinessReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    pub fn get(&self, business_id: TenantId) -> Option<BusinessReadModel> {
        self.store.get(TenantId::platform(), &business_id)
    }

    pub fn list(&self) -> Vec<BusinessReadModel> {
        let mut list = self.store.list(TenantId::platform());
        list.sort_by(|a, b| a.slug.cmp(&b.slug));
        list
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != BUSINESS_AGGREGATE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if tenant_id != TenantId::platform() {
            return Err(ProjectionError::TenantIsolation(
                "business events must be published under the platform tenant".to_string(),
            ));
        }

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: BusinessEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        match ev {
            BusinessEvent::BusinessRegistered(e) => {
                self.store.upsert(
                    TenantId::platform(),
                    e.business_id,
                    BusinessReadModel {
                        business_id: e.business_id,
                        name: e.name,
                        slug: e.slug,
                        suspended: false,
                        modules: BTreeMap::new(),
                    },
                );
            }
            BusinessEvent::BusinessSuspended(e) => {
                if let Some(mut rm) = self.get(e.business_id) {
                    rm.suspended = true;
                    self.store.upsert(TenantId::platform(), e.business_id, rm);
                }
            }
            BusinessEvent::BusinessReactivated(e) => {
                if let Some(mut rm) = self.get(e.business_id) {
                    rm.suspended = false;
                    self.store.upsert(TenantId::platform(), e.business_id, rm);
                }
            }
            BusinessEvent::ModuleToggled(e) => {
                if let Some(mut rm) = self.get(e.business_id) {
                    rm.modules.insert(e.module, e.enabled);
                    self.store.upsert(TenantId::platform(), e.business_id, rm);
                }
            }
        }

        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use vidaplena_core::AggregateId;
    use vidaplena_directory::business::{BusinessRegistered, BusinessSuspended, ModuleToggled};

    use crate::read_model::InMemoryTenantStore;

    fn envelope(business_id: TenantId, seq: u64, ev: &BusinessEvent) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            Uuid::now_v7(),
            TenantId::platform(),
            AggregateId::from_uuid(*business_id.as_uuid()),
            BUSINESS_AGGREGATE,
            seq,
            serde_json::to_value(ev).unwrap(),
        )
    }

    #[test]
    fn registry_tracks_suspension_and_modules() {
        let p = BusinessDirectoryProjection::new(InMemoryTenantStore::new());
        let business_id = TenantId::new();

        p.apply_envelope(&envelope(
            business_id,
            1,
            &BusinessEvent::BusinessRegistered(BusinessRegistered {
                business_id,
                name: "EcoSalud".to_string(),
                slug: "eco-salud".to_string(),
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();
        p.apply_envelope(&envelope(
            business_id,
            2,
            &BusinessEvent::ModuleToggled(ModuleToggled {
                business_id,
                module: "orders".to_string(),
                enabled: false,
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();
        p.apply_envelope(&envelope(
            business_id,
            3,
            &BusinessEvent::BusinessSuspended(BusinessSuspended {
                business_id,
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();

        let rm = p.get(business_id).unwrap();
        assert!(rm.suspended);
        assert_eq!(rm.modules.get("orders"), Some(&false));
        assert_eq!(p.list().len(), 1);
    }

    #[test]
    fn non_platform_envelope_is_rejected() {
        let p = BusinessDirectoryProjection::new(InMemoryTenantStore::new());
        let business_id = TenantId::new();

        let env = EventEnvelope::new(
            Uuid::now_v7(),
            TenantId::new(),
            AggregateId::from_uuid(*business_id.as_uuid()),
            BUSINESS_AGGREGATE,
            1,
            serde_json::to_value(BusinessEvent::BusinessRegistered(BusinessRegistered {
                business_id,
                name: "X".to_string(),
                slug: "x".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap(),
        );
        assert!(matches!(
            p.apply_envelope(&env),
            Err(ProjectionError::TenantIsolation(_))
        ));
    }
}
