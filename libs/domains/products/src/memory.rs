//! In-memory store for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{ProductError, ProductResult};
use crate::models::{Category, Product};
use crate::repository::{ApplicationRepository, ContextFactory, UnitOfWork};
use crate::tracking::{ChangeTracker, PendingChange, Tracked, pending_changes};

#[derive(Debug, Default)]
struct StoreState {
    products: BTreeMap<i32, Product>,
    categories: BTreeMap<i32, Category>,
    last_product_id: i32,
}

/// Shared product and category tables.
///
/// Ids are assigned in insertion order, so listing by key lists in
/// insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let state = StoreState {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            ..StoreState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn add_category(&self, category: Category) {
        self.state
            .write()
            .await
            .categories
            .insert(category.id, category);
    }

    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    /// Apply every change or none of them.
    async fn apply(&self, changes: Vec<PendingChange<Product>>) -> ProductResult<()> {
        let mut state = self.state.write().await;

        for change in &changes {
            let missing = match change {
                PendingChange::Update(handle) => {
                    let id = handle.read().await.id;
                    (!state.products.contains_key(&id)).then_some(id)
                }
                PendingChange::Delete(product) => {
                    (!state.products.contains_key(&product.id)).then_some(product.id)
                }
                PendingChange::Insert(_) => None,
            };
            if let Some(id) = missing {
                return Err(ProductError::Database(format!(
                    "product {} no longer exists",
                    id
                )));
            }
        }

        for change in changes {
            match change {
                PendingChange::Insert(handle) => {
                    state.last_product_id += 1;
                    let id = state.last_product_id;
                    let mut product = handle.write().await;
                    product.id = id;
                    state.products.insert(id, product.clone());
                    info!(product_id = id, "Inserted product");
                }
                PendingChange::Update(handle) => {
                    let mut product = handle.write().await;
                    product.updated_at = Utc::now();
                    state.products.insert(product.id, product.clone());
                    info!(product_id = product.id, "Updated product");
                }
                PendingChange::Delete(product) => {
                    state.products.remove(&product.id);
                    info!(product_id = product.id, "Deleted product");
                }
            }
        }

        Ok(())
    }
}

impl ContextFactory for InMemoryStore {
    type Repository = InMemoryProductRepository;
    type UnitOfWork = InMemoryUnitOfWork;

    fn create_context(&self) -> (Self::Repository, Self::UnitOfWork) {
        let context = Arc::new(InMemoryDbContext {
            store: self.clone(),
            tracker: Mutex::new(ChangeTracker::new()),
        });
        (
            InMemoryProductRepository {
                context: Arc::clone(&context),
            },
            InMemoryUnitOfWork { context },
        )
    }
}

/// One request's view of the store
#[derive(Debug)]
pub struct InMemoryDbContext {
    store: InMemoryStore,
    tracker: Mutex<ChangeTracker<Product>>,
}

impl InMemoryDbContext {
    fn tracker(&self) -> MutexGuard<'_, ChangeTracker<Product>> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    context: Arc<InMemoryDbContext>,
}

#[async_trait]
impl ApplicationRepository for InMemoryProductRepository {
    async fn get_products(&self) -> ProductResult<Vec<Product>> {
        let state = self.context.store.state.read().await;
        Ok(state.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i32) -> ProductResult<Option<Tracked<Product>>> {
        let product = self.context.store.state.read().await.products.get(&id).cloned();
        Ok(product.map(|p| self.context.tracker().attach(p)))
    }

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>> {
        let state = self.context.store.state.read().await;
        Ok(state.categories.get(&id).cloned())
    }

    fn add_product(&self, product: Product) -> Tracked<Product> {
        self.context.tracker().add(product)
    }

    fn remove_product(&self, product: &Tracked<Product>) {
        self.context.tracker().remove(product)
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryUnitOfWork {
    context: Arc<InMemoryDbContext>,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn complete(&self) -> ProductResult<()> {
        let entries = self.context.tracker().drain();
        let changes = pending_changes(entries).await;
        if changes.is_empty() {
            return Ok(());
        }
        self.context.store.apply(changes).await
    }
}
