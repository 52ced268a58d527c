use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use vidaplena_core::{Aggregate, AggregateId, DomainError, TenantId, UserId};
use vidaplena_directory::GlobalConfig;
use vidaplena_events::{EventBus, EventEnvelope, InMemoryEventBus, TenantScoped};
use vidaplena_infra::{
    command_dispatcher::{CommandDispatcher, DispatchError},
    event_store::{EventStore, InMemoryEventStore, StoredEvent},
    projections::{
        BusinessDirectoryProjection, BusinessReadModel, CatalogDocKey, InboxEntry,
        InboxProjection, LandingDocKey, OrderReadModel, OrdersProjection, PaymentSettingsProjection,
        PaymentsDocKey, PublicCatalogDoc, PublicCatalogProjection, PublicLandingDoc,
        PublicLandingProjection, UserDirectoryProjection, UserReadModel,
        businesses::BUSINESS_AGGREGATE,
        inbox::CONTACT_AGGREGATE,
        landing::{LANDING_AGGREGATE, PAYMENTS_AGGREGATE},
        orders::ORDER_AGGREGATE,
        public_catalog::PRODUCT_AGGREGATE,
        users::USER_AGGREGATE,
    },
    read_model::InMemoryTenantStore,
};
use vidaplena_messages::ContactThreadId;
use vidaplena_orders::OrderId;
use vidaplena_storefront::PaymentChannels;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub tenant_id: TenantId,
    pub topic: String,
    pub payload: serde_json::Value,
}

impl TenantScoped for RealtimeMessage {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

type Bus = Arc<InMemoryEventBus<EventEnvelope<serde_json::Value>>>;
type Dispatcher = CommandDispatcher<Arc<InMemoryEventStore>, Bus>;

type CatalogProjection =
    PublicCatalogProjection<Arc<InMemoryTenantStore<CatalogDocKey, PublicCatalogDoc>>>;
type LandingProjection =
    PublicLandingProjection<Arc<InMemoryTenantStore<LandingDocKey, PublicLandingDoc>>>;
type PaymentsProjection =
    PaymentSettingsProjection<Arc<InMemoryTenantStore<PaymentsDocKey, PaymentChannels>>>;
type OrderListProjection = OrdersProjection<Arc<InMemoryTenantStore<OrderId, OrderReadModel>>>;
type InboxListProjection = InboxProjection<Arc<InMemoryTenantStore<ContactThreadId, InboxEntry>>>;
type BusinessesProjection =
    BusinessDirectoryProjection<Arc<InMemoryTenantStore<TenantId, BusinessReadModel>>>;
type UsersProjection = UserDirectoryProjection<Arc<InMemoryTenantStore<UserId, UserReadModel>>>;

/// Infrastructure wiring shared by all routes: store, bus, dispatcher, and
/// the projections fed by the background subscriber.
pub struct AppServices {
    dispatcher: Arc<Dispatcher>,
    event_store: Arc<InMemoryEventStore>,
    catalog_projection: Arc<CatalogProjection>,
    landing_projection: Arc<LandingProjection>,
    payments_projection: Arc<PaymentsProjection>,
    orders_projection: Arc<OrderListProjection>,
    inbox_projection: Arc<InboxListProjection>,
    businesses_projection: Arc<BusinessesProjection>,
    users_projection: Arc<UsersProjection>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

pub fn build_services() -> AppServices {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: Bus = Arc::new(InMemoryEventBus::new());

    let catalog_projection: Arc<CatalogProjection> =
        Arc::new(PublicCatalogProjection::new(Arc::new(InMemoryTenantStore::new())));
    let landing_projection: Arc<LandingProjection> =
        Arc::new(PublicLandingProjection::new(Arc::new(InMemoryTenantStore::new())));
    let payments_projection: Arc<PaymentsProjection> =
        Arc::new(PaymentSettingsProjection::new(Arc::new(InMemoryTenantStore::new())));
    let orders_projection: Arc<OrderListProjection> =
        Arc::new(OrdersProjection::new(Arc::new(InMemoryTenantStore::new())));
    let inbox_projection: Arc<InboxListProjection> =
        Arc::new(InboxProjection::new(Arc::new(InMemoryTenantStore::new())));
    let businesses_projection: Arc<BusinessesProjection> =
        Arc::new(BusinessDirectoryProjection::new(Arc::new(InMemoryTenantStore::new())));
    let users_projection: Arc<UsersProjection> =
        Arc::new(UserDirectoryProjection::new(Arc::new(InMemoryTenantStore::new())));

    // Realtime channel (SSE): lossy broadcast, tenant-filtered in handlers.
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

    // Background subscriber: bus -> projections
    {
        let sub = bus.subscribe();
        let catalog_projection = catalog_projection.clone();
        let landing_projection = landing_projection.clone();
        let payments_projection = payments_projection.clone();
        let orders_projection = orders_projection.clone();
        let inbox_projection = inbox_projection.clone();
        let businesses_projection = businesses_projection.clone();
        let users_projection = users_projection.clone();
        let realtime_tx = realtime_tx.clone();
        tokio::task::spawn_blocking(move || {
            loop {
                match sub.recv() {
                    Ok(env) => {
                        let at = env.aggregate_type().to_string();

                        // Apply to the relevant projection(s) only. Landing and
                        // payments events feed more than one document.
                        let apply_ok = match at.as_str() {
                            PRODUCT_AGGREGATE => {
                                catalog_projection.apply_envelope(&env).map_err(|e| e.to_string())
                            }
                            LANDING_AGGREGATE => catalog_projection
                                .apply_envelope(&env)
                                .and_then(|_| landing_projection.apply_envelope(&env))
                                .map_err(|e| e.to_string()),
                            PAYMENTS_AGGREGATE => landing_projection
                                .apply_envelope(&env)
                                .and_then(|_| payments_projection.apply_envelope(&env))
                                .map_err(|e| e.to_string()),
                            ORDER_AGGREGATE => {
                                orders_projection.apply_envelope(&env).map_err(|e| e.to_string())
                            }
                            CONTACT_AGGREGATE => {
                                inbox_projection.apply_envelope(&env).map_err(|e| e.to_string())
                            }
                            BUSINESS_AGGREGATE => businesses_projection
                                .apply_envelope(&env)
                                .map_err(|e| e.to_string()),
                            USER_AGGREGATE => {
                                users_projection.apply_envelope(&env).map_err(|e| e.to_string())
                            }
                            _ => Ok(()),
                        };

                        if let Err(e) = apply_ok {
                            tracing::warn!("projection apply failed: {e}");
                            continue;
                        }

                        // Broadcast projection update (lossy; no backpressure on core).
                        let _ = realtime_tx.send(RealtimeMessage {
                            tenant_id: env.tenant_id(),
                            topic: format!("{at}.projection_updated"),
                            payload: serde_json::json!({
                                "kind": "projection_update",
                                "aggregate_type": at,
                                "aggregate_id": env.aggregate_id().to_string(),
                                "sequence_number": env.sequence_number(),
                            }),
                        });
                    }
                    Err(_) => break,
                }
            }
        });
    }

    let dispatcher = Arc::new(CommandDispatcher::new(store.clone(), bus));
    AppServices {
        dispatcher,
        event_store: store,
        catalog_projection,
        landing_projection,
        payments_projection,
        orders_projection,
        inbox_projection,
        businesses_projection,
        users_projection,
        realtime_tx,
    }
}

impl AppServices {
    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    pub fn dispatch<A>(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(TenantId, AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Event: vidaplena_events::Event + serde::Serialize + serde::de::DeserializeOwned,
    {
        self.dispatcher
            .dispatch::<A>(tenant_id, aggregate_id, aggregate_type, command, make_aggregate)
    }

    pub fn catalog_document(&self, tenant_id: TenantId) -> Option<PublicCatalogDoc> {
        self.catalog_projection.document(tenant_id)
    }

    pub fn landing_document(&self, tenant_id: TenantId) -> PublicLandingDoc {
        self.landing_projection.document(tenant_id)
    }

    pub fn payment_channels(&self, tenant_id: TenantId) -> PaymentChannels {
        self.payments_projection.channels(tenant_id)
    }

    pub fn orders_get(&self, tenant_id: TenantId, order_id: &OrderId) -> Option<OrderReadModel> {
        self.orders_projection.get(tenant_id, order_id)
    }

    pub fn orders_list(&self, tenant_id: TenantId) -> Vec<OrderReadModel> {
        self.orders_projection.list(tenant_id)
    }

    pub fn inbox_list(&self, tenant_id: TenantId) -> Vec<InboxEntry> {
        self.inbox_projection.list(tenant_id)
    }

    pub fn inbox_unread_count(&self, tenant_id: TenantId) -> usize {
        self.inbox_projection.unread_count(tenant_id)
    }

    pub fn businesses_get(&self, business_id: TenantId) -> Option<BusinessReadModel> {
        self.businesses_projection.get(business_id)
    }

    pub fn businesses_list(&self) -> Vec<BusinessReadModel> {
        self.businesses_projection.list()
    }

    pub fn users_get(&self, user_id: &UserId) -> Option<UserReadModel> {
        self.users_projection.get(user_id)
    }

    pub fn users_list(&self) -> Vec<UserReadModel> {
        self.users_projection.list()
    }

    /// Rehydrate the deployment-wide configuration singleton.
    ///
    /// No projection exists for it (admin-only, tiny stream), so reads go
    /// straight through the event store.
    pub fn global_config(&self) -> Result<GlobalConfig, DispatchError> {
        let history = self
            .event_store
            .load_stream(TenantId::platform(), GlobalConfig::singleton_id())?;

        let mut config = GlobalConfig::empty();
        for stored in &history {
            let event = serde_json::from_value(stored.payload.clone())
                .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
            config.apply(&event);
        }
        Ok(config)
    }
}

/// Build an SSE stream for a tenant (used by `/stream`).
pub fn tenant_sse_stream(
    services: Arc<AppServices>,
    tenant_id: TenantId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if TenantScoped::tenant_id(&m) == tenant_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
