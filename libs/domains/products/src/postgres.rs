//! PostgreSQL store backed by sea-orm.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryOrder,
    TransactionTrait,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, instrument};

use crate::entity::{category, product};
use crate::error::{ProductError, ProductResult};
use crate::models::{Category, Product};
use crate::repository::{ApplicationRepository, ContextFactory, UnitOfWork};
use crate::tracking::{ChangeTracker, PendingChange, Tracked, pending_changes};

/// Hands each request its own [`PgDbContext`] over the shared pool.
#[derive(Debug, Clone)]
pub struct PgContextFactory {
    db: DatabaseConnection,
}

impl PgContextFactory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ContextFactory for PgContextFactory {
    type Repository = PgProductRepository;
    type UnitOfWork = PgUnitOfWork;

    fn create_context(&self) -> (Self::Repository, Self::UnitOfWork) {
        let context = Arc::new(PgDbContext::new(self.db.clone()));
        (
            PgProductRepository {
                context: Arc::clone(&context),
            },
            PgUnitOfWork { context },
        )
    }
}

#[derive(Debug)]
pub struct PgDbContext {
    db: DatabaseConnection,
    tracker: Mutex<ChangeTracker<Product>>,
}

impl PgDbContext {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tracker: Mutex::new(ChangeTracker::new()),
        }
    }

    fn tracker(&self) -> MutexGuard<'_, ChangeTracker<Product>> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone)]
pub struct PgProductRepository {
    context: Arc<PgDbContext>,
}

#[async_trait]
impl ApplicationRepository for PgProductRepository {
    async fn get_products(&self) -> ProductResult<Vec<Product>> {
        let models = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&self.context.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: i32) -> ProductResult<Option<Tracked<Product>>> {
        let model = product::Entity::find_by_id(id)
            .one(&self.context.db)
            .await?;

        Ok(model.map(|m| self.context.tracker().attach(m.into())))
    }

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>> {
        let model = category::Entity::find_by_id(id)
            .one(&self.context.db)
            .await?;

        Ok(model.map(Category::from))
    }

    fn add_product(&self, product: Product) -> Tracked<Product> {
        self.context.tracker().add(product)
    }

    fn remove_product(&self, product: &Tracked<Product>) {
        self.context.tracker().remove(product)
    }
}

#[derive(Debug, Clone)]
pub struct PgUnitOfWork {
    context: Arc<PgDbContext>,
}

/// Row state to copy back into a tracked handle once the transaction commits
struct WriteBack {
    handle: Tracked<Product>,
    stored: Product,
}

impl PgUnitOfWork {
    async fn write(
        txn: &DatabaseTransaction,
        change: PendingChange<Product>,
    ) -> ProductResult<Option<WriteBack>> {
        match change {
            PendingChange::Insert(handle) => {
                let pending = handle.snapshot().await;
                let model = product::ActiveModel::for_insert(&pending)
                    .insert(txn)
                    .await?;
                info!(product_id = model.id, "Inserted product");
                Ok(Some(WriteBack {
                    handle,
                    stored: model.into(),
                }))
            }
            PendingChange::Update(handle) => {
                let mut current = handle.snapshot().await;
                current.updated_at = Utc::now();
                let model = product::ActiveModel::for_update(&current)
                    .update(txn)
                    .await?;
                info!(product_id = model.id, "Updated product");
                Ok(Some(WriteBack {
                    handle,
                    stored: model.into(),
                }))
            }
            PendingChange::Delete(product) => {
                let result = product::Entity::delete_by_id(product.id).exec(txn).await?;
                if result.rows_affected == 0 {
                    return Err(ProductError::Database(format!(
                        "product {} no longer exists",
                        product.id
                    )));
                }
                info!(product_id = product.id, "Deleted product");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    #[instrument(skip(self))]
    async fn complete(&self) -> ProductResult<()> {
        let entries = self.context.tracker().drain();
        let changes = pending_changes(entries).await;
        if changes.is_empty() {
            return Ok(());
        }

        let txn = self.context.db.begin().await?;
        let mut write_backs = Vec::with_capacity(changes.len());
        for change in changes {
            // Dropping `txn` on error rolls the transaction back
            if let Some(write_back) = Self::write(&txn, change).await? {
                write_backs.push(write_back);
            }
        }
        txn.commit().await?;

        for WriteBack { handle, stored } in write_backs {
            *handle.write().await = stored;
        }

        Ok(())
    }
}
