use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactThreadId(pub AggregateId);

impl ContactThreadId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ContactThreadId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: ContactThread.
///
/// One thread per accepted submission. Schema validation happens upstream
/// (the submission is matched against the tenant's current form schema
/// before this command is dispatched); the aggregate only guards its own
/// lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactThread {
    id: ContactThreadId,
    tenant_id: Option<TenantId>,
    values: BTreeMap<String, String>,
    read: bool,
    version: u64,
    submitted: bool,
}

impl ContactThread {
    pub fn empty(id: ContactThreadId) -> Self {
        Self {
            id,
            tenant_id: None,
            values: BTreeMap::new(),
            read: false,
            version: 0,
            submitted: false,
        }
    }

    pub fn id_typed(&self) -> ContactThreadId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_read(&self) -> bool {
        self.read
    }
}

impl AggregateRoot for ContactThread {
    type Id = ContactThreadId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitContact (public storefront intake, post-validation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitContact {
    pub tenant_id: TenantId,
    pub thread_id: ContactThreadId,
    pub values: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkThreadRead (tenant inbox).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkThreadRead {
    pub tenant_id: TenantId,
    pub thread_id: ContactThreadId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactCommand {
    SubmitContact(SubmitContact),
    MarkThreadRead(MarkThreadRead),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmitted {
    pub tenant_id: TenantId,
    pub thread_id: ContactThreadId,
    pub values: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMarkedRead {
    pub tenant_id: TenantId,
    pub thread_id: ContactThreadId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactEvent {
    ContactSubmitted(ContactSubmitted),
    ThreadMarkedRead(ThreadMarkedRead),
}

impl Event for ContactEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ContactEvent::ContactSubmitted(_) => "messages.contact.submitted",
            ContactEvent::ThreadMarkedRead(_) => "messages.contact.marked_read",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ContactEvent::ContactSubmitted(e) => e.occurred_at,
            ContactEvent::ThreadMarkedRead(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ContactThread {
    type Command = ContactCommand;
    type Event = ContactEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ContactEvent::ContactSubmitted(e) => {
                self.id = e.thread_id;
                self.tenant_id = Some(e.tenant_id);
                self.values = e.values.clone();
                self.submitted = true;
            }
            ContactEvent::ThreadMarkedRead(_) => {
                self.read = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ContactCommand::SubmitContact(cmd) => {
                if self.submitted {
                    return Err(DomainError::conflict("submission already recorded"));
                }
                if cmd.values.is_empty() {
                    return Err(DomainError::validation("submission cannot be empty"));
                }

                Ok(vec![ContactEvent::ContactSubmitted(ContactSubmitted {
                    tenant_id: cmd.tenant_id,
                    thread_id: cmd.thread_id,
                    values: cmd.values.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
            ContactCommand::MarkThreadRead(cmd) => {
                if !self.submitted {
                    return Err(DomainError::not_found());
                }
                if self.tenant_id != Some(cmd.tenant_id) {
                    return Err(DomainError::invariant("tenant mismatch"));
                }
                if self.read {
                    return Ok(vec![]);
                }

                Ok(vec![ContactEvent::ThreadMarkedRead(ThreadMarkedRead {
                    tenant_id: cmd.tenant_id,
                    thread_id: cmd.thread_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}
