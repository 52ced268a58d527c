//! Platform administration: businesses, users, global config.
//!
//! Super-admin surface: the business registry (tenants plus their module
//! toggles and suspension state), the platform user roster, and the global
//! deployment configuration. All streams here live under the reserved
//! platform tenant.

pub mod business;
pub mod global_config;
pub mod user;

pub use business::{
    Business, BusinessCommand, BusinessEvent, ReactivateBusiness, RegisterBusiness, SetModule,
    SuspendBusiness,
};
pub use global_config::{
    GlobalConfig, GlobalConfigCommand, GlobalConfigEvent, SetMaintenanceMode, SetSetting,
};
pub use user::{
    ChangeUserRole, DeleteUser, PlatformUser, RegisterUser, UserCommand, UserEvent,
};
