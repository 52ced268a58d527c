//! Platform user roster read model (platform admin).
//!
//! Deleted users are removed from the roster outright, matching the
//! terminal delete-user semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vidaplena_core::{TenantId, UserId};
use vidaplena_directory::UserEvent;
use vidaplena_events::EventEnvelope;

use crate::projections::{ProjectionError, SequenceCursors};
use crate::read_model::TenantStore;

pub const USER_AGGREGATE: &str = "directory.user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReadModel {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

#[derive(Debug)]
pub struct UserDirectoryProjection<S>
where
    S: TenantStore<UserId, UserReadModel>,
{
    store: S,
    cursors: SequenceCursors,
}

impl<S> UserDirectoryProjection<S>
where
    S: TenantStore<UserId, UserReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: SequenceCursors::new(),
        }
    }

    pub fn get(&self, user_id: &UserId) -> Option<UserReadModel> {
        self.store.get(TenantId::platform(), user_id)
    }

    pub fn list(&self) -> Vec<UserReadModel> {
        let mut list = self.store.list(TenantId::platform());
        list.sort_by(|a, b| a.email.cmp(&b.email));
        list
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != USER_AGGREGATE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if tenant_id != TenantId::platform() {
            return Err(ProjectionError::TenantIsolation(
                "user events must be published under the platform tenant".to_string(),
            ));
        }

        if !self.cursors.check(tenant_id, aggregate_id, seq)? {
            return Ok(());
        }

        let ev: UserEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        match ev {
            UserEvent::UserRegistered(e) => {
                self.store.upsert(
                    TenantId::platform(),
                    e.user_id,
                    UserReadModel {
                        user_id: e.user_id,
                        email: e.email,
                        display_name: e.display_name,
                        role: e.role,
                    },
                );
            }
            UserEvent::UserRoleChanged(e) => {
                if let Some(mut rm) = self.get(&e.user_id) {
                    rm.role = e.role;
                    self.store.upsert(TenantId::platform(), e.user_id, rm);
                }
            }
            UserEvent::UserDeleted(e) => {
                self.store.remove(TenantId::platform(), &e.user_id);
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
    use vidaplena_directory::user::{UserDeleted, UserRegistered, UserRoleChanged};

    use crate::read_model::InMemoryTenantStore;

    fn envelope(user_id: UserId, seq: u64, ev: &UserEvent) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            Uuid::now_v7(),
            TenantId::platform(),
            AggregateId::from_uuid(*user_id.as_uuid()),
            USER_AGGREGATE,
            seq,
            serde_json::to_value(ev).unwrap(),
        )
    }

    #[test]
    fn roster_tracks_roles_and_deletion() {
        let p = UserDirectoryProjection::new(InMemoryTenantStore::new());
        let user_id = UserId::new();

        p.apply_envelope(&envelope(
            user_id,
            1,
            &UserEvent::UserRegistered(UserRegistered {
                user_id,
                email: "owner@ecosalud.pe".to_string(),
                display_name: "Ana".to_string(),
                role: "owner".to_string(),
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();
        p.apply_envelope(&envelope(
            user_id,
            2,
            &UserEvent::UserRoleChanged(UserRoleChanged {
                user_id,
                role: "staff".to_string(),
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();
        assert_eq!(p.get(&user_id).unwrap().role, "staff");

        p.apply_envelope(&envelope(
            user_id,
            3,
            &UserEvent::UserDeleted(UserDeleted {
                user_id,
                occurred_at: Utc::now(),
            }),
        ))
        .unwrap();
        assert!(p.get(&user_id).is_none());
        assert!(p.list().is_empty());
    }
}
