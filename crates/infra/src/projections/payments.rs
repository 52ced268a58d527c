//! Payment settings projection (tenant back office).
//!
//! Unlike the landing document this exposes the full channel configuration,
//! including disabled channels and their saved fields, for the settings
//! screen.

use serde_json::Value as JsonValue;

use vidaplena_core::TenantId;
use vidaplena_events::EventEnvelope;
use vidaplena_storefront::{PaymentChannels, PaymentsEvent};

use crate::projections::{ProjectionError, SequenceCursors};
use crate::read_model::TenantStore;

pub const PAYMENTS_AGGREGATE: &str = "storefront.payments";

/// Singleton key for the per-tenant payment settings record.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PaymentsDocKey;

#[derive(Debug)]
pub struct PaymentSettingsProjection<S>
where
    S: TenantStore<PaymentsDocKey, PaymentChannels>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> PaymentSettingsProjection<S>
where
    S: TenantStore<PaymentsDocKey, PaymentChannels>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    pub fn channels(&self, tenant_id: TenantId) -> PaymentChannels {
        self.store
            .get(tenant_id, &PaymentsDocKey)
            .unwrap_or_default()
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != PAYMENTS_AGGREGATE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: PaymentsEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;
        let PaymentsEvent::PaymentsConfigured(e) = ev;

        if e.tenant_id != tenant_id {
            return Err(ProjectionError::TenantIsolation(
                "event tenant_id does not match envelope tenant_id".to_string(),
            ));
        }

        self.store.upsert(tenant_id, PaymentsDocKey, e.channels);
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
    use vidaplena_storefront::payments::PaymentsConfigured;
    use vidaplena_storefront::{MobileWalletChannel, PaymentSettingsId};

    use crate::read_model::InMemoryTenantStore;

    #[test]
    fn settings_are_replaced_wholesale() {
        let p = PaymentSettingsProjection::new(InMemoryTenantStore::new());
        let tenant = TenantId::new();
        let settings_id = PaymentSettingsId::new(AggregateId::new());

        let channels = PaymentChannels {
            mobile_wallet: MobileWalletChannel {
                enabled: true,
                provider: "Yape".to_string(),
                phone_number: "999111222".to_string(),
            },
            ..PaymentChannels::default()
        };

        let env = EventEnvelope::new(
            Uuid::now_v7(),
            tenant,
            settings_id.0,
            PAYMENTS_AGGREGATE,
            1,
            serde_json::to_value(PaymentsEvent::PaymentsConfigured(PaymentsConfigured {
                tenant_id: tenant,
                settings_id,
                channels: channels.clone(),
                occurred_at: Utc::now(),
            }))
            .unwrap(),
        );
        p.apply_envelope(&env).unwrap();

        assert_eq!(p.channels(tenant), channels);
        assert_eq!(p.channels(TenantId::new()), PaymentChannels::default());
    }
}
