//! Projections between products and their API resources.

use chrono::Utc;

use crate::models::{Product, ProductResource, SaveProductResource, UNASSIGNED_ID};

/// Maps between [`Product`] and its resources.
///
/// Only `name`, `description`, `price` and `category_id` cross the boundary;
/// the identifier is never taken from a payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductMapper;

impl ProductMapper {
    pub fn to_resource(&self, product: &Product) -> ProductResource {
        ProductResource {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            category_id: product.category_id,
        }
    }

    /// New, not yet persisted product
    pub fn to_entity(&self, payload: &SaveProductResource) -> Product {
        let now = Utc::now();
        Product {
            id: UNASSIGNED_ID,
            name: payload.name.clone(),
            description: payload.description.clone(),
            price: payload.price,
            category_id: payload.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mapped fields of an existing product in place
    pub fn merge_into(&self, payload: &SaveProductResource, product: &mut Product) {
        product.name.clone_from(&payload.name);
        product.description.clone_from(&payload.description);
        product.price = payload.price;
        product.category_id = payload.category_id;
    }
}
