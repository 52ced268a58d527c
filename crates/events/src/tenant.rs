use vidaplena_core::TenantId;

use crate::EventEnvelope;

/// Marker for messages carrying a tenant context.
///
/// Lets infrastructure components (subscription loops, the SSE fan-out)
/// filter or pin work to a single tenant without knowing payload types.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}

impl<E> TenantScoped for EventEnvelope<E> {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id()
    }
}
