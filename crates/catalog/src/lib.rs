//! Tenant product catalog (products, stock, ratings).
//!
//! Owns the `Product` aggregate: creation, merge-style updates (price,
//! stock, images, ...), explicit deletion and client ratings (running
//! weighted average with optional per-rater de-duplication).

pub mod product;

pub use product::{
    CreateProduct, DeleteProduct, Product, ProductCommand, ProductEvent, ProductId, RateProduct,
    UpdateProduct,
};
