//! Public landing projection.
//!
//! One document per tenant: the landing header, the contact-form schema
//! (the API also validates public submissions against it), and the payment
//! channels currently offered at checkout.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_core::TenantId;
use vidaplena_events::EventEnvelope;
use vidaplena_messages::FormSchema;
use vidaplena_storefront::{HeaderConfig, LandingEvent, PaymentsEvent};

use crate::projections::{ProjectionError, SequenceCursors, replay_order};
use crate::read_model::TenantStore;

pub const LANDING_AGGREGATE: &str = "storefront.landing";
pub const PAYMENTS_AGGREGATE: &str = "storefront.payments";

/// Singleton key for the per-tenant landing document.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct LandingDocKey;

/// The per-tenant public landing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLandingDoc {
    pub header: HeaderConfig,
    pub form: FormSchema,
    /// Channel identifiers offered at order intake.
    pub payment_channels: Vec<String>,
}

impl Default for PublicLandingDoc {
    fn default() -> Self {
        Self {
            header: HeaderConfig::default(),
            form: FormSchema::default_contact(),
            payment_channels: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct PublicLandingProjection<S>
where
    S: TenantStore<LandingDocKey, PublicLandingDoc>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> PublicLandingProjection<S>
where
    S: TenantStore<LandingDocKey, PublicLandingDoc>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    /// The landing document for a tenant; every tenant has one (defaults
    /// until configured).
    pub fn document(&self, tenant_id: TenantId) -> PublicLandingDoc {
        self.store
            .get(tenant_id, &LandingDocKey)
            .unwrap_or_default()
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        let relevant = matches!(
            envelope.aggregate_type(),
            LANDING_AGGREGATE | PAYMENTS_AGGREGATE
        );
        if !relevant {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let mut doc = self.document(tenant_id);

        match envelope.aggregate_type() {
            LANDING_AGGREGATE => {
                let ev: LandingEvent = serde_json::from_value(envelope.payload().clone())
                    .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;
                let event_tenant = match &ev {
                    LandingEvent::HeaderSet(e) => e.tenant_id,
                    LandingEvent::ContactFormSet(e) => e.tenant_id,
                };
                if event_tenant != tenant_id {
                    return Err(ProjectionError::TenantIsolation(
                        "event tenant_id does not match envelope tenant_id".to_string(),
                    ));
                }
                match ev {
                    LandingEvent::HeaderSet(e) => doc.header = e.header,
                    LandingEvent::ContactFormSet(e) => doc.form = e.schema,
                }
            }
            PAYMENTS_AGGREGATE => {
                let ev: PaymentsEvent = serde_json::from_value(envelope.payload().clone())
                    .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;
                let PaymentsEvent::PaymentsConfigured(e) = ev;
                if e.tenant_id != tenant_id {
                    return Err(ProjectionError::TenantIsolation(
                        "event tenant_id does not match envelope tenant_id".to_string(),
                    ));
                }
                doc.payment_channels =
                    e.channels.enabled().iter().map(|s| s.to_string()).collect();
            }
            _ => unreachable!(),
        }

        self.store.upsert(tenant_id, LandingDocKey, doc);
        self.cursors.commit(tenant_id, aggregate_id, seq);
        Ok(())
    }

    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), ProjectionError> {
        let (tenants, envs) = replay_order(envelopes);

        for t in tenants {
            self.store.clear_tenant(t);
            self.cursors.clear_tenant(t);
        }

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use vidaplena_core::AggregateId;
    use vidaplena_messages::{FormField, FormFieldKind};
    use vidaplena_storefront::landing::{ContactFormSet, HeaderSet};
    use vidaplena_storefront::payments::PaymentsConfigured;
    use vidaplena_storefront::{
        BankTransferChannel, LandingConfigId, PaymentChannels, PaymentSettingsId,
    };

    use crate::read_model::InMemoryTenantStore;

    fn projection() -> PublicLandingProjection<InMemoryTenantStore<LandingDocKey, PublicLandingDoc>>
    {
        PublicLandingProjection::new(InMemoryTenantStore::new())
    }

    fn envelope<E: serde::Serialize>(
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        seq: u64,
        payload: &E,
    ) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            Uuid::now_v7(),
            tenant_id,
            aggregate_id,
            aggregate_type,
            seq,
            serde_json::to_value(payload).unwrap(),
        )
    }

    #[test]
    fn defaults_until_configured() {
        let p = projection();
        let doc = p.document(TenantId::new());
        assert_eq!(doc.header.title, "Bienvenido");
        assert_eq!(doc.form.fields.len(), 3);
        assert!(doc.payment_channels.is_empty());
    }

    #[test]
    fn header_form_and_payments_all_land_in_one_document() {
        let p = projection();
        let tenant = TenantId::new();
        let landing_id = LandingConfigId::new(AggregateId::new());
        let settings_id = PaymentSettingsId::new(AggregateId::new());

        p.apply_envelope(&envelope(
            tenant,
            landing_id.0,
            LANDING_AGGREGATE,
            1,
            &LandingEvent::HeaderSet(HeaderSet {
                tenant_id: tenant,
                landing_id,
                header: HeaderConfig {
                    title: "EcoSalud".to_string(),
                    tagline: String::new(),
                    hero_image_url: None,
                    primary_color: None,
                },
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();

        p.apply_envelope(&envelope(
            tenant,
            landing_id.0,
            LANDING_AGGREGATE,
            2,
            &LandingEvent::ContactFormSet(ContactFormSet {
                tenant_id: tenant,
                landing_id,
                schema: FormSchema {
                    fields: vec![FormField {
                        label: "Consulta".to_string(),
                        kind: FormFieldKind::TextArea,
                        required: true,
                    }],
                },
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();

        p.apply_envelope(&envelope(
            tenant,
            settings_id.0,
            PAYMENTS_AGGREGATE,
            1,
            &PaymentsEvent::PaymentsConfigured(PaymentsConfigured {
                tenant_id: tenant,
                settings_id,
                channels: PaymentChannels {
                    bank_transfer: BankTransferChannel {
                        enabled: true,
                        bank_name: "BCP".to_string(),
                        account_holder: "EcoSalud".to_string(),
                        account_number: "191-0".to_string(),
                    },
                    ..PaymentChannels::default()
                },
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();

        let doc = p.document(tenant);
        assert_eq!(doc.header.title, "EcoSalud");
        assert_eq!(doc.form.fields[0].label, "Consulta");
        assert_eq!(doc.payment_channels, vec!["bank_transfer".to_string()]);
    }

    #[test]
    fn duplicate_delivery_is_idempotent() {
        let p = projection();
        let tenant = TenantId::new();
        let landing_id = LandingConfigId::new(AggregateId::new());

        let env = envelope(
            tenant,
            landing_id.0,
            LANDING_AGGREGATE,
            1,
            &LandingEvent::HeaderSet(HeaderSet {
                tenant_id: tenant,
                landing_id,
                header: HeaderConfig::default(),
                occurred_at: Utc::now(),
            }),
        );
        p.apply_envelope(&env).unwrap();
        p.apply_envelope(&env).unwrap();
    }
}
