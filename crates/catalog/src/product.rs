use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vidaplena_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use vidaplena_events::Event;

/// Product identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Product.
///
/// Ratings are stored as exact integers (`rating_sum`, `rating_count`), so
/// the published average is always `sum / count` with no drift. Deletion is
/// a terminal tombstone: the stream stays, the product stops accepting
/// commands and drops out of the public catalog on the next projection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    tenant_id: Option<TenantId>,
    name: String,
    description: String,
    /// Price in smallest currency unit (e.g., cents).
    price: u64,
    stock: i64,
    category: String,
    images: Vec<String>,
    rating_sum: u64,
    rating_count: u64,
    /// Rater keys that already voted (server-side de-duplication).
    raters: HashSet<String>,
    version: u64,
    created: bool,
    deleted: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            tenant_id: None,
            name: String::new(),
            description: String::new(),
            price: 0,
            stock: 0,
            category: String::new(),
            images: Vec::new(),
            rating_sum: 0,
            rating_count: 0,
            raters: HashSet::new(),
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn rating_count(&self) -> u64 {
        self.rating_count
    }

    pub fn rating_sum(&self) -> u64 {
        self.rating_sum
    }

    /// Running weighted average, `sum / count`; 0 while unrated.
    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.rating_sum as f64 / self.rating_count as f64
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: i64,
    pub category: String,
    pub images: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProduct (merge semantics: only `Some` fields change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RateProduct.
///
/// `rater` is an optional caller-supplied key (device/session). When
/// present, repeat votes from the same key are rejected; when absent the
/// rating is anonymous and de-duplication stays a client concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub rating: u8,
    pub rater: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
    DeleteProduct(DeleteProduct),
    RateProduct(RateProduct),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: i64,
    pub category: String,
    pub images: Vec<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated (carries only the changed fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub rating: u8,
    pub rater: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    ProductDeleted(ProductDeleted),
    ProductRated(ProductRated),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "catalog.product.created",
            ProductEvent::ProductUpdated(_) => "catalog.product.updated",
            ProductEvent::ProductDeleted(_) => "catalog.product.deleted",
            ProductEvent::ProductRated(_) => "catalog.product.rated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::ProductDeleted(e) => e.occurred_at,
            ProductEvent::ProductRated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.tenant_id = Some(e.tenant_id);
                self.name = e.name.clone();
                self.description = e.description.clone();
                self.price = e.price;
                self.stock = e.stock;
                self.category = e.category.clone();
                self.images = e.images.clone();
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                if let Some(name) = &e.name {
                    self.name = name.clone();
                }
                if let Some(description) = &e.description {
                    self.description = description.clone();
                }
                if let Some(price) = e.price {
                    self.price = price;
                }
                if let Some(stock) = e.stock {
                    self.stock = stock;
                }
                if let Some(category) = &e.category {
                    self.category = category.clone();
                }
                if let Some(images) = &e.images {
                    self.images = images.clone();
                }
            }
            ProductEvent::ProductDeleted(_) => {
                self.deleted = true;
            }
            ProductEvent::ProductRated(e) => {
                self.rating_sum += u64::from(e.rating);
                self.rating_count += 1;
                if let Some(rater) = &e.rater {
                    self.raters.insert(rater.clone());
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
            ProductCommand::DeleteProduct(cmd) => self.handle_delete(cmd),
            ProductCommand::RateProduct(cmd) => self.handle_rate(cmd),
        }
    }
}

impl Product {
    fn ensure_tenant(&self, tenant_id: TenantId) -> Result<(), DomainError> {
        if !self.created {
            return Ok(());
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(())
    }

    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), DomainError> {
        if !self.created || self.deleted {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if cmd.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            price: cmd.price,
            stock: cmd.stock,
            category: cmd.category.clone(),
            images: cmd.images.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_live()?;
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_product_id(cmd.product_id)?;

        if let Some(name) = &cmd.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if let Some(stock) = cmd.stock {
            if stock < 0 {
                return Err(DomainError::validation("stock cannot be negative"));
            }
        }

        // A merge-write with nothing to merge is a no-op, not an error.
        if cmd.name.is_none()
            && cmd.description.is_none()
            && cmd.price.is_none()
            && cmd.stock.is_none()
            && cmd.category.is_none()
            && cmd.images.is_none()
        {
            return Ok(vec![]);
        }

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            description: cmd.description.clone(),
            price: cmd.price,
            stock: cmd.stock,
            category: cmd.category.clone(),
            images: cmd.images.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeleteProduct) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_live()?;
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_product_id(cmd.product_id)?;

        Ok(vec![ProductEvent::ProductDeleted(ProductDeleted {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_rate(&self, cmd: &RateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        // Rating a missing or deleted product fails the whole operation.
        self.ensure_live()?;
        self.ensure_tenant(cmd.tenant_id)?;
        self.ensure_product_id(cmd.product_id)?;

        if !(1..=5).contains(&cmd.rating) {
            return Err(DomainError::validation("rating must be between 1 and 5"));
        }

        if let Some(rater) = &cmd.rater {
            if rater.trim().is_empty() {
                return Err(DomainError::validation("rater key cannot be empty"));
            }
            if self.raters.contains(rater) {
                return Err(DomainError::conflict("rater has already voted"));
            }
        }

        Ok(vec![ProductEvent::ProductRated(ProductRated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            rating: cmd.rating,
            rater: cmd.rater.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_tenant_id() -> TenantId {
        TenantId::new()
    }

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn create_cmd(tenant_id: TenantId, product_id: ProductId) -> CreateProduct {
        CreateProduct {
            tenant_id,
            product_id,
            name: "Herbal Tea".to_string(),
            description: "Loose-leaf blend".to_string(),
            price: 1250,
            stock: 40,
            category: "beverages".to_string(),
            images: vec!["https://img.example/tea.jpg".to_string()],
            occurred_at: test_time(),
        }
    }

    fn created_product(tenant_id: TenantId, product_id: ProductId) -> Product {
        let mut product = Product::empty(product_id);
        let events = product
            .handle(&ProductCommand::CreateProduct(create_cmd(tenant_id, product_id)))
            .unwrap();
        product.apply(&events[0]);
        product
    }

    fn rate(product: &mut Product, rating: u8, rater: Option<&str>) -> Result<(), DomainError> {
        let tenant_id = product.tenant_id().unwrap();
        let cmd = RateProduct {
            tenant_id,
            product_id: product.id_typed(),
            rating,
            rater: rater.map(str::to_string),
            occurred_at: test_time(),
        };
        let events = product.handle(&ProductCommand::RateProduct(cmd))?;
        for e in &events {
            product.apply(e);
        }
        Ok(())
    }

    #[test]
    fn create_product_emits_product_created_event() {
        let product = Product::empty(test_product_id());
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();

        let events = product
            .handle(&ProductCommand::CreateProduct(create_cmd(tenant_id, product_id)))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ProductEvent::ProductCreated(e) => {
                assert_eq!(e.tenant_id, tenant_id);
                assert_eq!(e.product_id, product_id);
                assert_eq!(e.name, "Herbal Tea");
                assert_eq!(e.price, 1250);
                assert_eq!(e.stock, 40);
            }
            _ => panic!("Expected ProductCreated event"),
        }
    }

    #[test]
    fn create_product_rejects_empty_name() {
        let product = Product::empty(test_product_id());
        let mut cmd = create_cmd(test_tenant_id(), test_product_id());
        cmd.name = "   ".to_string();

        let err = product.handle(&ProductCommand::CreateProduct(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_product_rejects_duplicate_creation() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let product = created_product(tenant_id, product_id);

        let err = product
            .handle(&ProductCommand::CreateProduct(create_cmd(tenant_id, product_id)))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn rating_twice_with_4_and_5_yields_average_4_5() {
        let mut product = created_product(test_tenant_id(), test_product_id());

        rate(&mut product, 4, None).unwrap();
        rate(&mut product, 5, None).unwrap();

        assert_eq!(product.rating_count(), 2);
        assert_eq!(product.average_rating(), 4.5);
    }

    #[test]
    fn rating_starts_at_zero() {
        let product = created_product(test_tenant_id(), test_product_id());
        assert_eq!(product.rating_count(), 0);
        assert_eq!(product.average_rating(), 0.0);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let mut product = created_product(test_tenant_id(), test_product_id());
        assert!(matches!(rate(&mut product, 0, None), Err(DomainError::Validation(_))));
        assert!(matches!(rate(&mut product, 6, None), Err(DomainError::Validation(_))));
        assert_eq!(product.rating_count(), 0);
    }

    #[test]
    fn rating_nonexistent_product_fails_without_mutation() {
        let product = Product::empty(test_product_id());
        let cmd = RateProduct {
            tenant_id: test_tenant_id(),
            product_id: product.id_typed(),
            rating: 5,
            rater: None,
            occurred_at: test_time(),
        };

        let err = product.handle(&ProductCommand::RateProduct(cmd)).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
        assert_eq!(product.version(), 0);
        assert_eq!(product.rating_count(), 0);
    }

    #[test]
    fn rating_deleted_product_fails() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let mut product = created_product(tenant_id, product_id);

        let events = product
            .handle(&ProductCommand::DeleteProduct(DeleteProduct {
                tenant_id,
                product_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        product.apply(&events[0]);

        assert_eq!(rate(&mut product, 5, None), Err(DomainError::NotFound));
    }

    #[test]
    fn repeat_vote_from_same_rater_key_is_rejected() {
        let mut product = created_product(test_tenant_id(), test_product_id());

        rate(&mut product, 4, Some("device-abc")).unwrap();
        let err = rate(&mut product, 5, Some("device-abc")).unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(product.rating_count(), 1);
        assert_eq!(product.average_rating(), 4.0);
    }

    #[test]
    fn anonymous_repeat_votes_are_allowed() {
        let mut product = created_product(test_tenant_id(), test_product_id());

        rate(&mut product, 3, None).unwrap();
        rate(&mut product, 3, None).unwrap();

        assert_eq!(product.rating_count(), 2);
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let mut product = created_product(tenant_id, product_id);

        let events = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                tenant_id,
                product_id,
                name: None,
                description: None,
                price: Some(1500),
                stock: None,
                category: None,
                images: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        product.apply(&events[0]);

        assert_eq!(product.price(), 1500);
        assert_eq!(product.name(), "Herbal Tea");
        assert_eq!(product.stock(), 40);
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let product = created_product(tenant_id, product_id);

        let events = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                tenant_id,
                product_id,
                name: None,
                description: None,
                price: None,
                stock: None,
                category: None,
                images: None,
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn update_rejects_negative_stock() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let product = created_product(tenant_id, product_id);

        let err = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                tenant_id,
                product_id,
                name: None,
                description: None,
                price: None,
                stock: Some(-1),
                category: None,
                images: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_after_delete_is_not_found() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let mut product = created_product(tenant_id, product_id);

        let events = product
            .handle(&ProductCommand::DeleteProduct(DeleteProduct {
                tenant_id,
                product_id,
                occurred_at: test_time(),
            }))
            .unwrap();
        product.apply(&events[0]);
        assert!(product.is_deleted());

        let err = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                tenant_id,
                product_id,
                name: Some("x".to_string()),
                description: None,
                price: None,
                stock: None,
                category: None,
                images: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn commands_from_wrong_tenant_are_rejected() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let product = created_product(tenant_id, product_id);

        let err = product
            .handle(&ProductCommand::DeleteProduct(DeleteProduct {
                tenant_id: test_tenant_id(),
                product_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn version_increments_on_apply() {
        let tenant_id = test_tenant_id();
        let product_id = test_product_id();
        let mut product = created_product(tenant_id, product_id);
        assert_eq!(product.version(), 1);

        rate(&mut product, 5, None).unwrap();
        assert_eq!(product.version(), 2);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut product = created_product(test_tenant_id(), test_product_id());
        let before = product.clone();

        let cmd = ProductCommand::RateProduct(RateProduct {
            tenant_id: product.tenant_id().unwrap(),
            product_id: product.id_typed(),
            rating: 5,
            rater: None,
            occurred_at: test_time(),
        });

        let events1 = product.handle(&cmd).unwrap();
        let events2 = product.handle(&cmd).unwrap();

        assert_eq!(product, before);
        assert_eq!(events1, events2);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: sequential ratings produce the exact arithmetic mean.
            #[test]
            fn average_equals_arithmetic_mean(ratings in proptest::collection::vec(1u8..=5, 1..64)) {
                let mut product = created_product(test_tenant_id(), test_product_id());

                for r in &ratings {
                    rate(&mut product, *r, None).unwrap();
                }

                let expected =
                    ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;
                prop_assert_eq!(product.rating_count(), ratings.len() as u64);
                prop_assert!((product.average_rating() - expected).abs() < 1e-9);
            }

            /// Property: the average always stays within [0, 5] and the count
            /// never decreases.
            #[test]
            fn rating_invariants_hold(ratings in proptest::collection::vec(0u8..=7, 0..64)) {
                let mut product = created_product(test_tenant_id(), test_product_id());
                let mut last_count = 0;

                for r in &ratings {
                    let _ = rate(&mut product, *r, None);
                    let avg = product.average_rating();
                    prop_assert!((0.0..=5.0).contains(&avg));
                    prop_assert!(product.rating_count() >= last_count);
                    last_count = product.rating_count();
                }
            }

            /// Property: a rater key contributes at most one vote regardless of
            /// how often it retries.
            #[test]
            fn rater_key_votes_at_most_once(attempts in 1usize..10, rating in 1u8..=5) {
                let mut product = created_product(test_tenant_id(), test_product_id());

                for _ in 0..attempts {
                    let _ = rate(&mut product, rating, Some("same-device"));
                }

                prop_assert_eq!(product.rating_count(), 1);
            }
        }
    }
}
