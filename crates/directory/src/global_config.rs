use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use vidaplena_events::Event;
use uuid::Uuid;

/// Aggregate root: GlobalConfig.
///
/// Singleton per deployment (fixed stream id): free-form key/value settings
/// plus the maintenance-mode switch. No explicit create; the empty state is
/// the valid default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    settings: BTreeMap<String, String>,
    maintenance_mode: bool,
    version: u64,
}

impl GlobalConfig {
    /// The fixed aggregate id of the singleton stream.
    pub fn singleton_id() -> AggregateId {
        // Stable id so every node addresses the same stream.
        AggregateId::from_uuid(Uuid::from_u128(1))
    }

    pub fn empty() -> Self {
        Self {
            settings: BTreeMap::new(),
            maintenance_mode: false,
            version: 0,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }

    pub fn maintenance_mode(&self) -> bool {
        self.maintenance_mode
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl AggregateRoot for GlobalConfig {
    type Id = AggregateId;

    fn id(&self) -> &Self::Id {
        // The singleton never has a per-instance id.
        static ID: std::sync::OnceLock<AggregateId> = std::sync::OnceLock::new();
        ID.get_or_init(GlobalConfig::singleton_id)
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SetSetting (upsert one key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSetting {
    pub key: String,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetMaintenanceMode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMaintenanceMode {
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalConfigCommand {
    SetSetting(SetSetting),
    SetMaintenanceMode(SetMaintenanceMode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingSet {
    pub key: String,
    pub value: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceModeSet {
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalConfigEvent {
    SettingSet(SettingSet),
    MaintenanceModeSet(MaintenanceModeSet),
}

impl Event for GlobalConfigEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GlobalConfigEvent::SettingSet(_) => "directory.config.setting_set",
            GlobalConfigEvent::MaintenanceModeSet(_) => "directory.config.maintenance_set",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GlobalConfigEvent::SettingSet(e) => e.occurred_at,
            GlobalConfigEvent::MaintenanceModeSet(e) => e.occurred_at,
        }
    }
}

impl Aggregate for GlobalConfig {
    type Command = GlobalConfigCommand;
    type Event = GlobalConfigEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            GlobalConfigEvent::SettingSet(e) => {
                self.settings.insert(e.key.clone(), e.value.clone());
            }
            GlobalConfigEvent::MaintenanceModeSet(e) => {
                self.maintenance_mode = e.enabled;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            GlobalConfigCommand::SetSetting(cmd) => {
                if cmd.key.trim().is_empty() {
                    return Err(DomainError::validation("setting key cannot be empty"));
                }
                if self.get(&cmd.key) == Some(cmd.value.as_str()) {
                    return Ok(vec![]);
                }

                Ok(vec![GlobalConfigEvent::SettingSet(SettingSet {
                    key: cmd.key.clone(),
                    value: cmd.value.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
            GlobalConfigCommand::SetMaintenanceMode(cmd) => {
                if cmd.enabled == self.maintenance_mode {
                    return Ok(vec![]);
                }

                Ok(vec![GlobalConfigEvent::MaintenanceModeSet(MaintenanceModeSet {
                    enabled: cmd.enabled,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_upsert() {
        let mut config = GlobalConfig::empty();

        let events = config
            .handle(&GlobalConfigCommand::SetSetting(SetSetting {
                key: "support_email".to_string(),
                value: "soporte@vidaplena.pe".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        config.apply(&events[0]);
        assert_eq!(config.get("support_email"), Some("soporte@vidaplena.pe"));

        let events = config
            .handle(&GlobalConfigCommand::SetSetting(SetSetting {
                key: "support_email".to_string(),
                value: "hola@vidaplena.pe".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        config.apply(&events[0]);
        assert_eq!(config.get("support_email"), Some("hola@vidaplena.pe"));
        assert_eq!(config.settings().len(), 1);
    }

    #[test]
    fn empty_key_is_rejected() {
        let config = GlobalConfig::empty();
        let err = config
            .handle(&GlobalConfigCommand::SetSetting(SetSetting {
                key: " ".to_string(),
                value: "x".to_string(),
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn same_value_is_a_no_op() {
        let mut config = GlobalConfig::empty();
        let cmd = GlobalConfigCommand::SetSetting(SetSetting {
            key: "k".to_string(),
            value: "v".to_string(),
            occurred_at: Utc::now(),
        });
        let events = config.handle(&cmd).unwrap();
        config.apply(&events[0]);

        assert!(config.handle(&cmd).unwrap().is_empty());
    }

    #[test]
    fn maintenance_mode_toggles() {
        let mut config = GlobalConfig::empty();
        assert!(!config.maintenance_mode());

        let events = config
            .handle(&GlobalConfigCommand::SetMaintenanceMode(SetMaintenanceMode {
                enabled: true,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        config.apply(&events[0]);
        assert!(config.maintenance_mode());

        assert!(config
            .handle(&GlobalConfigCommand::SetMaintenanceMode(SetMaintenanceMode {
                enabled: true,
                occurred_at: Utc::now(),
            }))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn singleton_id_is_stable() {
        assert_eq!(GlobalConfig::singleton_id(), GlobalConfig::singleton_id());
    }
}
