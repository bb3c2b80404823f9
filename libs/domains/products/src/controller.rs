//! Product use cases over a repository and unit of work.

use observability::ProductMetrics;
use tracing::{info, instrument};

use crate::error::{ProductError, ProductResult};
use crate::mapper::ProductMapper;
use crate::models::{ProductResource, SaveProductResource};
use crate::repository::{ApplicationRepository, UnitOfWork};

/// Handles one request: validates, stages at most one change and commits it.
pub struct ProductsController<R, U> {
    repository: R,
    unit_of_work: U,
    mapper: ProductMapper,
}

impl<R, U> ProductsController<R, U>
where
    R: ApplicationRepository,
    U: UnitOfWork,
{
    pub fn new(repository: R, unit_of_work: U, mapper: ProductMapper) -> Self {
        Self {
            repository,
            unit_of_work,
            mapper,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<ProductResource>> {
        let products = self.repository.get_products().await?;
        Ok(products.iter().map(|p| self.mapper.to_resource(p)).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<ProductResource> {
        let product = self
            .repository
            .get_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        let resource = self.mapper.to_resource(&*product.read().await);
        Ok(resource)
    }

    #[instrument(skip(self, payload), fields(category_id = payload.category_id))]
    pub async fn create_product(
        &self,
        payload: SaveProductResource,
    ) -> ProductResult<ProductResource> {
        self.ensure_category(payload.category_id).await?;

        let product = self.repository.add_product(self.mapper.to_entity(&payload));
        self.unit_of_work.complete().await?;

        let resource = self.mapper.to_resource(&*product.read().await);
        info!(product_id = resource.id, "Product created");
        ProductMetrics::record_created(resource.category_id);
        Ok(resource)
    }

    /// The category is checked before the product is looked up, so an
    /// unknown category wins over an unknown id.
    #[instrument(skip(self, payload), fields(category_id = payload.category_id))]
    pub async fn update_product(&self, id: i32, payload: SaveProductResource) -> ProductResult<()> {
        self.ensure_category(payload.category_id).await?;

        let product = self
            .repository
            .get_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        self.mapper.merge_into(&payload, &mut *product.write().await);
        self.unit_of_work.complete().await?;

        info!(product_id = id, "Product updated");
        ProductMetrics::record_updated(payload.category_id);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<()> {
        let product = self
            .repository
            .get_product(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        self.repository.remove_product(&product);
        self.unit_of_work.complete().await?;

        info!(product_id = id, "Product deleted");
        ProductMetrics::record_deleted();
        Ok(())
    }

    async fn ensure_category(&self, category_id: i32) -> ProductResult<()> {
        if self.repository.get_category(category_id).await?.is_some() {
            return Ok(());
        }

        info!(category_id, "Rejected product with unknown category");
        ProductMetrics::record_validation_failure("CategoryId");
        Err(ProductError::invalid_category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Product};
    use crate::repository::{MockApplicationRepository, MockUnitOfWork};
    use crate::tracking::Tracked;
    use chrono::Utc;
    use mockall::Sequence;
    use mockall::predicate::eq;
    use std::sync::{Arc, Mutex};

    fn payload(category_id: i32) -> SaveProductResource {
        SaveProductResource {
            name: "Widget".to_string(),
            description: None,
            price: 9.99,
            category_id,
        }
    }

    fn stored(id: i32) -> Product {
        let now = Utc::now();
        Product {
            id,
            name: "Existing".to_string(),
            description: Some("Old".to_string()),
            price: 1.0,
            category_id: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn controller(
        repository: MockApplicationRepository,
        unit_of_work: MockUnitOfWork,
    ) -> ProductsController<MockApplicationRepository, MockUnitOfWork> {
        ProductsController::new(repository, unit_of_work, ProductMapper)
    }

    fn no_commit() -> MockUnitOfWork {
        let mut uow = MockUnitOfWork::new();
        uow.expect_complete().never();
        uow
    }

    #[tokio::test]
    async fn test_list_products_projects_every_product() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_products()
            .returning(|| Ok(vec![stored(1), stored(2)]));

        let resources = controller(repo, no_commit()).list_products().await.unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1].id, 2);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_product()
            .with(eq(9))
            .returning(|_| Ok(None));

        let err = controller(repo, no_commit()).get_product(9).await.unwrap_err();

        assert!(matches!(err, ProductError::NotFound(9)));
    }

    #[tokio::test]
    async fn test_get_product_projects_loaded_entity() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_product()
            .with(eq(4))
            .returning(|id| Ok(Some(Tracked::new(stored(id)))));

        let resource = controller(repo, no_commit()).get_product(4).await.unwrap();

        assert_eq!(resource.id, 4);
        assert_eq!(resource.name, "Existing");
        assert_eq!(resource.description.as_deref(), Some("Old"));
        assert_eq!(resource.category_id, 1);
    }

    #[tokio::test]
    async fn test_create_with_unknown_category_stages_nothing() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_category()
            .with(eq(999))
            .returning(|_| Ok(None));
        repo.expect_add_product().never();

        let err = controller(repo, no_commit())
            .create_product(payload(999))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProductError::InvalidField { field: "CategoryId", .. }
        ));
    }

    #[tokio::test]
    async fn test_create_validates_then_stages_then_commits() {
        let mut seq = Sequence::new();
        let mut repo = MockApplicationRepository::new();
        let mut uow = MockUnitOfWork::new();

        repo.expect_get_category()
            .with(eq(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Some(Category::new(id, "Toys"))));

        let slot: Arc<Mutex<Option<Tracked<Product>>>> = Arc::default();
        let staged = Arc::clone(&slot);
        repo.expect_add_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |product| {
                assert_eq!(product.id, 0);
                assert_eq!(product.category_id, 3);
                let tracked = Tracked::new(product);
                *staged.lock().unwrap() = Some(tracked.clone());
                tracked
            });

        // Stand-in for the store assigning the id at commit
        let committed = Arc::clone(&slot);
        uow.expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move || {
                let tracked = committed.lock().unwrap().clone().unwrap();
                futures::executor::block_on(async { tracked.write().await.id = 12 });
                Ok(())
            });

        let resource = controller(repo, uow).create_product(payload(3)).await.unwrap();

        assert_eq!(resource.id, 12);
        assert_eq!(resource.name, "Widget");
        assert_eq!(resource.category_id, 3);
    }

    #[tokio::test]
    async fn test_update_checks_category_before_product() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_category().returning(|_| Ok(None));
        repo.expect_get_product().never();

        let err = controller(repo, no_commit())
            .update_product(404, payload(999))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidField { .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_product_with_valid_category() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_category()
            .returning(|id| Ok(Some(Category::new(id, "Toys"))));
        repo.expect_get_product()
            .with(eq(404))
            .returning(|_| Ok(None));

        let err = controller(repo, no_commit())
            .update_product(404, payload(3))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(404)));
    }

    #[tokio::test]
    async fn test_update_merges_in_place_and_commits() {
        let tracked = Tracked::new(stored(5));
        let original = tracked.snapshot().await;
        let handle = tracked.clone();

        let mut repo = MockApplicationRepository::new();
        repo.expect_get_category()
            .returning(|id| Ok(Some(Category::new(id, "Toys"))));
        repo.expect_get_product()
            .with(eq(5))
            .returning(move |_| Ok(Some(handle.clone())));
        let mut uow = MockUnitOfWork::new();
        uow.expect_complete().times(1).returning(|| Ok(()));

        controller(repo, uow)
            .update_product(5, payload(3))
            .await
            .unwrap();

        let product = tracked.snapshot().await;
        assert_eq!(product.id, 5);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.description, None);
        assert_eq!(product.category_id, 3);
        assert_eq!(product.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_delete_unknown_product_does_not_commit() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_product().returning(|_| Ok(None));
        repo.expect_remove_product().never();

        let err = controller(repo, no_commit())
            .delete_product(8)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(8)));
    }

    #[tokio::test]
    async fn test_delete_removes_then_commits() {
        let tracked = Tracked::new(stored(8));
        let handle = tracked.clone();
        let mut seq = Sequence::new();

        let mut repo = MockApplicationRepository::new();
        repo.expect_get_product()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(handle.clone())));
        repo.expect_remove_product()
            .withf(move |p| p.same_entity(&tracked))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let mut uow = MockUnitOfWork::new();
        uow.expect_complete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(()));

        controller(repo, uow).delete_product(8).await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_failure_propagates() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_get_category()
            .returning(|id| Ok(Some(Category::new(id, "Toys"))));
        repo.expect_add_product().returning(Tracked::new);
        let mut uow = MockUnitOfWork::new();
        uow.expect_complete()
            .returning(|| Err(ProductError::Database("connection reset".to_string())));

        let err = controller(repo, uow)
            .create_product(payload(3))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Database(_)));
    }
}
