use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;
use vidaplena_messages::FormSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandingConfigId(pub AggregateId);

/// Namespace for deriving the per-tenant landing stream id.
const LANDING_STREAM_NS: uuid::Uuid = uuid::uuid!("b7c3e1a0-5f62-4d0e-9a47-3c8f2d1b6e90");

impl LandingConfigId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    /// Stream id for a tenant's landing singleton.
    ///
    /// Derived (UUIDv5) from the tenant id so every writer and reader
    /// addresses the same stream without coordination.
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self(AggregateId::from_uuid(uuid::Uuid::new_v5(
            &LANDING_STREAM_NS,
            tenant_id.as_uuid().as_bytes(),
        )))
    }
}

impl core::fmt::Display for LandingConfigId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Public landing-page header for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    pub title: String,
    pub tagline: String,
    pub hero_image_url: Option<String>,
    pub primary_color: Option<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: "Bienvenido".to_string(),
            tagline: String::new(),
            hero_image_url: None,
            primary_color: None,
        }
    }
}

/// Aggregate root: LandingConfig (singleton per tenant).
///
/// There is no explicit create command: the aggregate starts from defaults
/// and the first `SetHeader`/`SetContactForm` binds the tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingConfig {
    id: LandingConfigId,
    tenant_id: Option<TenantId>,
    header: HeaderConfig,
    form_schema: FormSchema,
    version: u64,
}

impl LandingConfig {
    pub fn empty(id: LandingConfigId) -> Self {
        Self {
            id,
            tenant_id: None,
            header: HeaderConfig::default(),
            form_schema: FormSchema::default_contact(),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> LandingConfigId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn header(&self) -> &HeaderConfig {
        &self.header
    }

    pub fn form_schema(&self) -> &FormSchema {
        &self.form_schema
    }
}

impl AggregateRoot for LandingConfig {
    type Id = LandingConfigId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SetHeader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetHeader {
    pub tenant_id: TenantId,
    pub landing_id: LandingConfigId,
    pub header: HeaderConfig,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetContactForm (replaces the whole schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetContactForm {
    pub tenant_id: TenantId,
    pub landing_id: LandingConfigId,
    pub schema: FormSchema,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingCommand {
    SetHeader(SetHeader),
    SetContactForm(SetContactForm),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSet {
    pub tenant_id: TenantId,
    pub landing_id: LandingConfigId,
    pub header: HeaderConfig,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormSet {
    pub tenant_id: TenantId,
    pub landing_id: LandingConfigId,
    pub schema: FormSchema,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingEvent {
    HeaderSet(HeaderSet),
    ContactFormSet(ContactFormSet),
}

impl Event for LandingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LandingEvent::HeaderSet(_) => "storefront.landing.header_set",
            LandingEvent::ContactFormSet(_) => "storefront.landing.form_set",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LandingEvent::HeaderSet(e) => e.occurred_at,
            LandingEvent::ContactFormSet(e) => e.occurred_at,
        }
    }
}

impl Aggregate for LandingConfig {
    type Command = LandingCommand;
    type Event = LandingEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LandingEvent::HeaderSet(e) => {
                self.id = e.landing_id;
                self.tenant_id = Some(e.tenant_id);
                self.header = e.header.clone();
            }
            LandingEvent::ContactFormSet(e) => {
                self.id = e.landing_id;
                self.tenant_id = Some(e.tenant_id);
                self.form_schema = e.schema.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LandingCommand::SetHeader(cmd) => {
                self.ensure_tenant(cmd.tenant_id)?;

                if cmd.header.title.trim().is_empty() {
                    return Err(DomainError::validation("header title cannot be empty"));
                }
                if cmd.header == self.header {
                    return Ok(vec![]);
                }

                Ok(vec![LandingEvent::HeaderSet(HeaderSet {
                    tenant_id: cmd.tenant_id,
                    landing_id: cmd.landing_id,
                    header: cmd.header.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
            LandingCommand::SetContactForm(cmd) => {
                self.ensure_tenant(cmd.tenant_id)?;

                cmd.schema
                    .check_well_formed()
                    .map_err(|e| DomainError::validation(e.to_string()))?;

                Ok(vec![LandingEvent::ContactFormSet(ContactFormSet {
                    tenant_id: cmd.tenant_id,
                    landing_id: cmd.landing_id,
                    schema: cmd.schema.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

impl LandingConfig {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        match self.tenant_id {
            None => Ok(()),
            Some(t) if t == tenant_id => Ok(()),
            Some(_) => Err(DomainError::invariant("tenant mismatch")),
        }
    }
}
