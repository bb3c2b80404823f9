//! Products Domain
//!
//! CRUD over products, with category validation and an explicit unit of
//! work per request.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, one controller per request
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Controller  │  ← Validation, staging, commit
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────────────┐
//! │ Repository + UnitOfWork     │  ← Share one change tracker per request
//! └──────┬──────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Store     │  ← PostgreSQL (sea-orm) or in-memory
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{InMemoryStore, handlers, models::Category};
//!
//! let store = InMemoryStore::with_categories([Category::new(1, "Books")]);
//! let router = handlers::router(store);
//! ```

pub mod controller;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod tracking;

pub use controller::ProductsController;
pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use mapper::ProductMapper;
pub use memory::InMemoryStore;
pub use models::{Category, Product, ProductResource, SaveProductResource};
pub use postgres::PgContextFactory;
pub use repository::{ApplicationRepository, ContextFactory, UnitOfWork};
pub use tracking::Tracked;
