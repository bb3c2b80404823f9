use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::{Category, Product};
use crate::tracking::Tracked;

/// Product and category access for a single request.
///
/// Reads return tracked handles where the caller may mutate or remove the
/// entity; nothing reaches the store until [`UnitOfWork::complete`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// All products in the store's natural order
    async fn get_products(&self) -> ProductResult<Vec<Product>>;

    async fn get_product(&self, id: i32) -> ProductResult<Option<Tracked<Product>>>;

    async fn get_category(&self, id: i32) -> ProductResult<Option<Category>>;

    /// Stage an insertion; the id is assigned at commit
    fn add_product(&self, product: Product) -> Tracked<Product>;

    fn remove_product(&self, product: &Tracked<Product>);
}

/// Commits everything staged through the request's repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Write all pending changes atomically
    async fn complete(&self) -> ProductResult<()>;
}

/// Creates the per-request repository and unit of work over one shared
/// change tracker.
pub trait ContextFactory: Send + Sync + 'static {
    type Repository: ApplicationRepository;
    type UnitOfWork: UnitOfWork;

    fn create_context(&self) -> (Self::Repository, Self::UnitOfWork);
}
