//! Benchmarks for the rate-product write path and the public catalog
//! projection rebuild.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;

use vidaplena_catalog::{CreateProduct, Product, ProductCommand, ProductId, RateProduct};
use vidaplena_core::{AggregateId, TenantId};
use vidaplena_events::{EventEnvelope, InMemoryEventBus};
use vidaplena_infra::command_dispatcher::CommandDispatcher;
use vidaplena_infra::event_store::InMemoryEventStore;
use vidaplena_infra::projections::{CatalogDocKey, PublicCatalogDoc, PublicCatalogProjection};
use vidaplena_infra::read_model::InMemoryTenantStore;

type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;
type Dispatcher = CommandDispatcher<Arc<InMemoryEventStore>, Bus>;

fn setup() -> (Dispatcher, TenantId, ProductId) {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: Bus = Arc::new(InMemoryEventBus::new());
    let dispatcher = CommandDispatcher::new(store, bus);
    let tenant = TenantId::new();
    let product_id = ProductId::new(AggregateId::new());

    dispatcher
        .dispatch(
            tenant,
            product_id.0,
            "catalog.product",
            ProductCommand::CreateProduct(CreateProduct {
                tenant_id: tenant,
                product_id,
                name: "Herbal Tea".to_string(),
                description: String::new(),
                price: 1250,
                stock: 40,
                category: "beverages".to_string(),
                images: vec![],
                occurred_at: Utc::now(),
            }),
            |_, id| Product::empty(ProductId::new(id)),
        )
        .expect("create product");

    (dispatcher, tenant, product_id)
}

fn rate_once(dispatcher: &Dispatcher, tenant: TenantId, product_id: ProductId, rating: u8) {
    dispatcher
        .dispatch(
            tenant,
            product_id.0,
            "catalog.product",
            ProductCommand::RateProduct(RateProduct {
                tenant_id: tenant,
                product_id,
                rating,
                rater: None,
                occurred_at: Utc::now(),
            }),
            |_, id| Product::empty(ProductId::new(id)),
        )
        .expect("rate product");
}

fn bench_rate_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("rate_product_dispatch");
    group.throughput(Throughput::Elements(1));

    // Stream length grows with each prior rating, so measure at several
    // pre-populated depths.
    for depth in [0u32, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let (dispatcher, tenant, product_id) = setup();
            for _ in 0..depth {
                rate_once(&dispatcher, tenant, product_id, 4);
            }
            b.iter(|| rate_once(&dispatcher, black_box(tenant), black_box(product_id), 5));
        });
    }

    group.finish();
}

fn bench_catalog_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("public_catalog_rebuild");

    for ratings in [100u32, 1_000] {
        group.throughput(Throughput::Elements(u64::from(ratings)));
        group.bench_with_input(
            BenchmarkId::from_parameter(ratings),
            &ratings,
            |b, &ratings| {
                let (dispatcher, tenant, product_id) = setup();
                for _ in 0..ratings {
                    rate_once(&dispatcher, tenant, product_id, 4);
                }
                let events = dispatcher.store().all_events().expect("snapshot");

                b.iter(|| {
                    let projection: PublicCatalogProjection<
                        InMemoryTenantStore<CatalogDocKey, PublicCatalogDoc>,
                    > = PublicCatalogProjection::new(InMemoryTenantStore::new());
                    projection
                        .rebuild_from_scratch(events.iter().map(|e| e.to_envelope()))
                        .expect("rebuild");
                    black_box(projection.document(black_box(tenant)))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rate_dispatch, bench_catalog_rebuild);
criterion_main!(benches);
