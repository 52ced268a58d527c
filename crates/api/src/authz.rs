//! API-side authorization guard for commands.
//!
//! Enforcement happens at the command boundary (before dispatch), keeping
//! domain aggregates and infra auth-agnostic.

use vidaplena_auth::{
    AuthzError, CommandAuthorization, Permission, Principal, Role, TenantMembership, authorize,
};

use crate::context::{PrincipalContext, TenantContext};

/// Check authorization for a command in the current request context.
///
/// Intended to be called **before** dispatching a command.
pub fn authorize_command<C: CommandAuthorization>(
    tenant: &TenantContext,
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let membership = TenantMembership {
        tenant_id: tenant.tenant_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        active_tenant_id: tenant.tenant_id(),
        membership,
    };

    for perm in command.required_permissions() {
        authorize(&principal, perm)?;
    }

    Ok(())
}

/// Role→permission policy.
///
/// Static until a real policy source exists: `admin` (platform operators)
/// gets everything, `owner` gets the full tenant surface, `staff` gets the
/// day-to-day subset.
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r.as_str() == "admin") {
        return vec![Permission::new("*")];
    }

    if roles.iter().any(|r| r.as_str() == "owner") {
        return vec![
            Permission::new("catalog.write"),
            Permission::new("orders.manage"),
            Permission::new("inbox.read"),
            Permission::new("landing.write"),
            Permission::new("payments.write"),
        ];
    }

    if roles.iter().any(|r| r.as_str() == "staff") {
        return vec![
            Permission::new("catalog.write"),
            Permission::new("orders.manage"),
            Permission::new("inbox.read"),
        ];
    }

    Vec::new()
}
