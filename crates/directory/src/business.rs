use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;

/// Aggregate root: Business.
///
/// One stream per registered business; the aggregate id is the business's
/// own `TenantId`. Module toggles gate nothing at the domain layer; they
/// are configuration surfaced to clients (which panels the tenant sees).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Business {
    id: TenantId,
    name: String,
    slug: String,
    suspended: bool,
    modules: BTreeMap<String, bool>,
    version: u64,
    registered: bool,
}

/// Module identifiers a business can have toggled.
pub const KNOWN_MODULES: &[&str] = &["catalog", "orders", "inbox", "landing", "payments"];

impl Business {
    pub fn empty(id: TenantId) -> Self {
        Self {
            id,
            name: String::new(),
            slug: String::new(),
            suspended: false,
            modules: BTreeMap::new(),
            version: 0,
            registered: false,
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Module toggle state; unknown modules default to enabled.
    pub fn module_enabled(&self, module: &str) -> bool {
        self.modules.get(module).copied().unwrap_or(true)
    }

    pub fn modules(&self) -> &BTreeMap<String, bool> {
        &self.modules
    }
}

impl AggregateRoot for Business {
    type Id = TenantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterBusiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBusiness {
    pub business_id: TenantId,
    pub name: String,
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SuspendBusiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendBusiness {
    pub business_id: TenantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReactivateBusiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactivateBusiness {
    pub business_id: TenantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetModule (toggle one module for the business).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetModule {
    pub business_id: TenantId,
    pub module: String,
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessCommand {
    RegisterBusiness(RegisterBusiness),
    SuspendBusiness(SuspendBusiness),
    ReactivateBusiness(ReactivateBusiness),
    SetModule(SetModule),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRegistered {
    pub business_id: TenantId,
    pub name: String,
    pub slug: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessSuspended {
    pub business_id: TenantId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessReactivated {
    pub business_id: TenantId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleToggled {
    pub business_id: TenantId,
    pub module: String,
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessEvent {
    BusinessRegistered(BusinessRegistered),
    BusinessSuspended(BusinessSuspended),
    BusinessReactivated(BusinessReactivated),
    ModuleToggled(ModuleToggled),
}

impl Event for BusinessEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BusinessEvent::BusinessRegistered(_) => "directory.business.registered",
            BusinessEvent::BusinessSuspended(_) => "directory.business.suspended",
            BusinessEvent::BusinessReactivated(_) => "directory.business.reactivated",
            BusinessEvent::ModuleToggled(_) => "directory.business.module_toggled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BusinessEvent::BusinessRegistered(e) => e.occurred_at,
            BusinessEvent::BusinessSuspended(e) => e.occurred_at,
            BusinessEvent::BusinessReactivated(e) => e.occurred_at,
            BusinessEvent::ModuleToggled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Business {
    type Command = BusinessCommand;
    type Event = BusinessEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BusinessEvent::BusinessRegistered(e) => {
                self.id = e.business_id;
                self.name = e.name.clone();
                self.slug = e.slug.clone();
                self.registered = true;
            }
            BusinessEvent::BusinessSuspended(_) => {
                self.suspended = true;
            }
            BusinessEvent::BusinessReactivated(_) => {
                self.suspended = false;
            }
            BusinessEvent::ModuleToggled(e) => {
                self.modules.insert(e.module.clone(), e.enabled);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BusinessCommand::RegisterBusiness(cmd) => self.handle_register(cmd),
            BusinessCommand::SuspendBusiness(cmd) => {
                self.ensure_registered()?;
                if self.suspended {
                    return Ok(vec![]);
                }
                Ok(vec![BusinessEvent::BusinessSuspended(BusinessSuspended {
                    business_id: cmd.business_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
            BusinessCommand::ReactivateBusiness(cmd) => {
                self.ensure_registered()?;
                if !self.suspended {
                    return Ok(vec![]);
                }
                Ok(vec![BusinessEvent::BusinessReactivated(BusinessReactivated {
                    business_id: cmd.business_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
            BusinessCommand::SetModule(cmd) => {
                self.ensure_registered()?;
                if !KNOWN_MODULES.contains(&cmd.module.as_str()) {
                    return Err(DomainError::validation(format!(
                        "unknown module '{}'",
                        cmd.module
                    )));
                }
                if self.module_enabled(&cmd.module) == cmd.enabled {
                    return Ok(vec![]);
                }
                Ok(vec![BusinessEvent::ModuleToggled(ModuleToggled {
                    business_id: cmd.business_id,
                    module: cmd.module.clone(),
                    enabled: cmd.enabled,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

impl Business {
    fn ensure_registered(&self) -> Result<(), DomainError> {
        if !self.registered {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_register(&self, cmd: &RegisterBusiness) -> Result<Vec<BusinessEvent>, DomainError> {
        if self.registered {
            return Err(DomainError::conflict("business already registered"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        check_slug(&cmd.slug)?;

        Ok(vec![BusinessEvent::BusinessRegistered(BusinessRegistered {
            business_id: cmd.business_id,
            name: cmd.name.clone(),
            slug: cmd.slug.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// Slug: lowercase alphanumerics and hyphens, non-empty, no leading or
/// trailing hyphen.
fn check_slug(slug: &str) -> Result<(), DomainError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation(format!("invalid slug '{slug}'")))
    }
}
