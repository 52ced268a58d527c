use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateRoot, DomainError, UserId};
use vidaplena_events::Event;

/// Aggregate root: PlatformUser.
///
/// Directory entries for the people who operate tenants (and the platform
/// itself). There is no credential material here; identity proof is the
/// JWT, this is the roster it points into. Deletion is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformUser {
    id: UserId,
    email: String,
    display_name: String,
    role: String,
    deleted: bool,
    version: u64,
    registered: bool,
}

impl PlatformUser {
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            email: String::new(),
            display_name: String::new(),
            role: String::new(),
            deleted: false,
            version: 0,
            registered: false,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl AggregateRoot for PlatformUser {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterUser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeUserRole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeUserRole {
    pub user_id: UserId,
    pub role: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteUser (privileged, terminal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserCommand {
    RegisterUser(RegisterUser),
    ChangeUserRole(ChangeUserRole),
    DeleteUser(DeleteUser),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleChanged {
    pub user_id: UserId,
    pub role: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    UserRegistered(UserRegistered),
    UserRoleChanged(UserRoleChanged),
    UserDeleted(UserDeleted),
}

impl Event for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::UserRegistered(_) => "directory.user.registered",
            UserEvent::UserRoleChanged(_) => "directory.user.role_changed",
            UserEvent::UserDeleted(_) => "directory.user.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::UserRegistered(e) => e.occurred_at,
            UserEvent::UserRoleChanged(e) => e.occurred_at,
            UserEvent::UserDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for PlatformUser {
    type Command = UserCommand;
    type Event = UserEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            UserEvent::UserRegistered(e) => {
                self.id = e.user_id;
                self.email = e.email.clone();
                self.display_name = e.display_name.clone();
                self.role = e.role.clone();
                self.registered = true;
            }
            UserEvent::UserRoleChanged(e) => {
                self.role = e.role.clone();
            }
            UserEvent::UserDeleted(_) => {
                self.deleted = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UserCommand::RegisterUser(cmd) => {
                if self.registered {
                    return Err(DomainError::conflict("user already registered"));
                }
                check_email(&cmd.email)?;
                if cmd.display_name.trim().is_empty() {
                    return Err(DomainError::validation("display name cannot be empty"));
                }
                if cmd.role.trim().is_empty() {
                    return Err(DomainError::validation("role cannot be empty"));
                }

                Ok(vec![UserEvent::UserRegistered(UserRegistered {
                    user_id: cmd.user_id,
                    email: cmd.email.clone(),
                    display_name: cmd.display_name.clone(),
                    role: cmd.role.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
            UserCommand::ChangeUserRole(cmd) => {
                self.ensure_live()?;
                if cmd.role.trim().is_empty() {
                    return Err(DomainError::validation("role cannot be empty"));
                }
                if cmd.role == self.role {
                    return Ok(vec![]);
                }

                Ok(vec![UserEvent::UserRoleChanged(UserRoleChanged {
                    user_id: cmd.user_id,
                    role: cmd.role.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
            UserCommand::DeleteUser(cmd) => {
                self.ensure_live()?;

                Ok(vec![UserEvent::UserDeleted(UserDeleted {
                    user_id: cmd.user_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

impl PlatformUser {
    fn ensure_live(&self) -> Result<(), DomainError> {
        if !self.registered || self.deleted {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}

fn check_email(email: &str) -> Result<(), DomainError> {
    let shaped = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if shaped && !email.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(DomainError::validation(format!("invalid email '{email}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_cmd(user_id: UserId) -> RegisterUser {
        RegisterUser {
            user_id,
            email: "owner@ecosalud.pe".to_string(),
            display_name: "Ana Pérez".to_string(),
            role: "owner".to_string(),
            occurred_at: Utc::now(),
        }
    }

    fn registered(user_id: UserId) -> PlatformUser {
        let mut user = PlatformUser::empty(user_id);
        let events = user
            .handle(&UserCommand::RegisterUser(register_cmd(user_id)))
            .unwrap();
        user.apply(&events[0]);
        user
    }

    #[test]
    fn register_records_profile() {
        let id = UserId::new();
        let user = registered(id);
        assert_eq!(user.email(), "owner@ecosalud.pe");
        assert_eq!(user.role(), "owner");
        assert!(!user.is_deleted());
    }

    #[test]
    fn register_rejects_malformed_email() {
        let id = UserId::new();
        let user = PlatformUser::empty(id);
        let mut cmd = register_cmd(id);
        cmd.email = "not-an-email".to_string();

        let err = user.handle(&UserCommand::RegisterUser(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn change_role_replaces_role() {
        let id = UserId::new();
        let mut user = registered(id);

        let events = user
            .handle(&UserCommand::ChangeUserRole(ChangeUserRole {
                user_id: id,
                role: "staff".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        user.apply(&events[0]);
        assert_eq!(user.role(), "staff");
    }

    #[test]
    fn change_to_same_role_is_a_no_op() {
        let id = UserId::new();
        let user = registered(id);
        assert!(user
            .handle(&UserCommand::ChangeUserRole(ChangeUserRole {
                user_id: id,
                role: "owner".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn delete_is_terminal() {
        let id = UserId::new();
        let mut user = registered(id);

        let events = user
            .handle(&UserCommand::DeleteUser(DeleteUser {
                user_id: id,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        user.apply(&events[0]);
        assert!(user.is_deleted());

        let err = user
            .handle(&UserCommand::ChangeUserRole(ChangeUserRole {
                user_id: id,
                role: "staff".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);

        let err = user
            .handle(&UserCommand::DeleteUser(DeleteUser {
                user_id: id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn operations_on_unregistered_user_are_not_found() {
        let id = UserId::new();
        let user = PlatformUser::empty(id);
        let err = user
            .handle(&UserCommand::DeleteUser(DeleteUser {
                user_id: id,
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }
}
