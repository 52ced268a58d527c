//! Public storefront configuration: landing page and payment channels.
//!
//! `LandingConfig` is the tenant's public face (header plus contact-form
//! schema); `PaymentSettings` holds the payment channels offered at order
//! intake. Both are per-tenant singletons.

pub mod landing;
pub mod payments;

pub use landing::{
    HeaderConfig, LandingCommand, LandingConfig, LandingConfigId, LandingEvent, SetContactForm,
    SetHeader,
};
pub use payments::{
    BankTransferChannel, CashOnDeliveryChannel, ConfigurePayments, MobileWalletChannel,
    PaymentChannels, PaymentsCommand, PaymentsEvent, PaymentSettings, PaymentSettingsId,
};
