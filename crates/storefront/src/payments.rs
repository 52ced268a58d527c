use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentSettingsId(pub AggregateId);

/// Namespace for deriving the per-tenant payment-settings stream id.
const PAYMENTS_STREAM_NS: uuid::Uuid = uuid::uuid!("6f2a9c84-1d3b-4e57-8a0c-d94b5e7f1230");

impl PaymentSettingsId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    /// Stream id for a tenant's payment-settings singleton, derived (UUIDv5)
    /// from the tenant id.
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self(AggregateId::from_uuid(uuid::Uuid::new_v5(
            &PAYMENTS_STREAM_NS,
            tenant_id.as_uuid().as_bytes(),
        )))
    }
}

impl core::fmt::Display for PaymentSettingsId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Bank transfer channel. Fields are only meaningful while enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankTransferChannel {
    pub enabled: bool,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
}

/// Mobile wallet channel (Yape/Plin style).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileWalletChannel {
    pub enabled: bool,
    pub provider: String,
    pub phone_number: String,
}

/// Cash on delivery channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOnDeliveryChannel {
    pub enabled: bool,
    pub instructions: String,
}

/// All payment channels a tenant can offer at order intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentChannels {
    pub bank_transfer: BankTransferChannel,
    pub mobile_wallet: MobileWalletChannel,
    pub cash_on_delivery: CashOnDeliveryChannel,
}

impl PaymentChannels {
    /// Channel identifiers currently offered, in a fixed order.
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.bank_transfer.enabled {
            out.push("bank_transfer");
        }
        if self.mobile_wallet.enabled {
            out.push("mobile_wallet");
        }
        if self.cash_on_delivery.enabled {
            out.push("cash_on_delivery");
        }
        out
    }

    /// Enabled channels must carry their mandatory fields; disabled channels
    /// are not inspected at all.
    fn check(&self) -> Result<(), DomainError> {
        if self.bank_transfer.enabled {
            let c = &self.bank_transfer;
            if c.bank_name.trim().is_empty()
                || c.account_holder.trim().is_empty()
                || c.account_number.trim().is_empty()
            {
                return Err(DomainError::validation(
                    "bank transfer requires bank name, account holder and account number",
                ));
            }
        }
        if self.mobile_wallet.enabled {
            let c = &self.mobile_wallet;
            if c.provider.trim().is_empty() || c.phone_number.trim().is_empty() {
                return Err(DomainError::validation(
                    "mobile wallet requires provider and phone number",
                ));
            }
        }
        if self.cash_on_delivery.enabled && self.cash_on_delivery.instructions.trim().is_empty() {
            return Err(DomainError::validation(
                "cash on delivery requires instructions",
            ));
        }
        Ok(())
    }
}

/// Aggregate root: PaymentSettings (singleton per tenant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSettings {
    id: PaymentSettingsId,
    tenant_id: Option<TenantId>,
    channels: PaymentChannels,
    version: u64,
}

impl PaymentSettings {
    pub fn empty(id: PaymentSettingsId) -> Self {
        Self {
            id,
            tenant_id: None,
            channels: PaymentChannels::default(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> PaymentSettingsId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn channels(&self) -> &PaymentChannels {
        &self.channels
    }
}

impl AggregateRoot for PaymentSettings {
    type Id = PaymentSettingsId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ConfigurePayments (full replace of the channel set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurePayments {
    pub tenant_id: TenantId,
    pub settings_id: PaymentSettingsId,
    pub channels: PaymentChannels,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentsCommand {
    ConfigurePayments(ConfigurePayments),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentsConfigured {
    pub tenant_id: TenantId,
    pub settings_id: PaymentSettingsId,
    pub channels: PaymentChannels,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentsEvent {
    PaymentsConfigured(PaymentsConfigured),
}

impl Event for PaymentsEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentsEvent::PaymentsConfigured(_) => "storefront.payments.configured",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PaymentsEvent::PaymentsConfigured(e) => e.occurred_at,
        }
    }
}

impl Aggregate for PaymentSettings {
    type Command = PaymentsCommand;
    type Event = PaymentsEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PaymentsEvent::PaymentsConfigured(e) => {
                self.id = e.settings_id;
                self.tenant_id = Some(e.tenant_id);
                self.channels = e.channels.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PaymentsCommand::ConfigurePayments(cmd) => {
                if let Some(t) = self.tenant_id {
                    if t != cmd.tenant_id {
                        return Err(DomainError::invariant("tenant mismatch"));
                    }
                }

                cmd.channels.check()?;

                if self.tenant_id.is_some() && cmd.channels == self.channels {
                    return Ok(vec![]);
                }

                Ok(vec![PaymentsEvent::PaymentsConfigured(PaymentsConfigured {
                    tenant_id: cmd.tenant_id,
                    settings_id: cmd.settings_id,
                    channels: cmd.channels.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_id() -> PaymentSettingsId {
        PaymentSettingsId::new(AggregateId::new())
    }

    fn full_channels() -> PaymentChannels {
        PaymentChannels {
            bank_transfer: BankTransferChannel {
                enabled: true,
                bank_name: "BCP".to_string(),
                account_holder: "EcoSalud SAC".to_string(),
                account_number: "191-1234567-0-00".to_string(),
            },
            mobile_wallet: MobileWalletChannel {
                enabled: true,
                provider: "Yape".to_string(),
                phone_number: "999111222".to_string(),
            },
            cash_on_delivery: CashOnDeliveryChannel {
                enabled: false,
                instructions: String::new(),
            },
        }
    }

    fn configure(
        settings: &PaymentSettings,
        tenant_id: TenantId,
        channels: PaymentChannels,
    ) -> Result<Vec<PaymentsEvent>, DomainError> {
        settings.handle(&PaymentsCommand::ConfigurePayments(ConfigurePayments {
            tenant_id,
            settings_id: settings.id_typed(),
            channels,
            occurred_at: Utc::now(),
        }))
    }

    #[test]
    fn configure_stores_channels() {
        let tenant_id = TenantId::new();
        let mut settings = PaymentSettings::empty(test_id());

        let events = configure(&settings, tenant_id, full_channels()).unwrap();
        settings.apply(&events[0]);

        assert_eq!(settings.tenant_id(), Some(tenant_id));
        assert_eq!(
            settings.channels().enabled(),
            vec!["bank_transfer", "mobile_wallet"]
        );
    }

    #[test]
    fn enabled_channel_requires_its_fields() {
        let settings = PaymentSettings::empty(test_id());
        let mut channels = full_channels();
        channels.bank_transfer.account_number = "  ".to_string();

        let err = configure(&settings, TenantId::new(), channels).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn disabled_channel_fields_are_not_validated() {
        let settings = PaymentSettings::empty(test_id());
        let mut channels = full_channels();
        channels.mobile_wallet = MobileWalletChannel {
            enabled: false,
            provider: String::new(),
            phone_number: String::new(),
        };

        assert!(configure(&settings, TenantId::new(), channels).is_ok());
    }

    #[test]
    fn cash_on_delivery_needs_instructions_when_enabled() {
        let settings = PaymentSettings::empty(test_id());
        let mut channels = full_channels();
        channels.cash_on_delivery.enabled = true;

        let err = configure(&settings, TenantId::new(), channels.clone()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        channels.cash_on_delivery.instructions = "Pago exacto al repartidor".to_string();
        assert!(configure(&settings, TenantId::new(), channels).is_ok());
    }

    #[test]
    fn reconfiguring_identical_channels_is_a_no_op() {
        let tenant_id = TenantId::new();
        let mut settings = PaymentSettings::empty(test_id());

        let events = configure(&settings, tenant_id, full_channels()).unwrap();
        settings.apply(&events[0]);

        assert!(configure(&settings, tenant_id, full_channels()).unwrap().is_empty());
    }

    #[test]
    fn other_tenant_cannot_reconfigure() {
        let mut settings = PaymentSettings::empty(test_id());
        let events = configure(&settings, TenantId::new(), full_channels()).unwrap();
        settings.apply(&events[0]);

        let err = configure(&settings, TenantId::new(), PaymentChannels::default()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn all_channels_disabled_is_valid() {
        let settings = PaymentSettings::empty(test_id());
        assert!(configure(&settings, TenantId::new(), PaymentChannels::default()).is_ok());
    }
}
