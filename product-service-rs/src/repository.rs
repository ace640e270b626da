//! Document-store seam for products.
//!
//! The store itself is an external collaborator; domain code only depends
//! on the `ProductRepository` trait. `MemoryProductRepository` backs the
//! binary and the tests.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Product, ProductFilter, UpdateProduct};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: Product) -> Result<(), RepositoryError>;
    async fn find_all(
        &self,
        filter: &ProductFilter,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError>;
    async fn count(&self, filter: &ProductFilter) -> Result<usize, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError>;
    async fn update(
        &self,
        id: &str,
        changes: UpdateProduct,
    ) -> Result<Option<Product>, RepositoryError>;
}

/// In-memory store, insertion-ordered.
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    items: RwLock<Vec<Product>>,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn insert(&self, product: Product) -> Result<(), RepositoryError> {
        self.items.write().await.push(product);
        Ok(())
    }

    async fn find_all(
        &self,
        filter: &ProductFilter,
        limit: usize,
    ) -> Result<Vec<Product>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|product| filter.matches(product))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<usize, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|product| filter.matches(product)).count())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|product| product.id == id).cloned())
    }

    async fn update(
        &self,
        id: &str,
        changes: UpdateProduct,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut items = self.items.write().await;
        let Some(product) = items.iter_mut().find(|product| product.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(image) = changes.image {
            product.image = Some(image);
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: 10.0,
            description: None,
            image: None,
            create_by: "admin".to_string(),
            update_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
            delete_date: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_by_id() {
        let repo = MemoryProductRepository::new();
        repo.insert(product("p-1", "shirt")).await.unwrap();

        let found = repo.find_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(found.name, "shirt");
        assert!(repo.find_by_id("p-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_applies_filter_and_limit() {
        let repo = MemoryProductRepository::new();
        for i in 0..5 {
            repo.insert(product(&format!("p-{}", i), "shirt")).await.unwrap();
        }
        repo.insert(product("p-hat", "hat")).await.unwrap();

        let filter = ProductFilter {
            name: Some("shirt".to_string()),
            price: None,
        };
        let found = repo.find_all(&filter, 3).await.unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(repo.count(&filter).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields_only() {
        let repo = MemoryProductRepository::new();
        repo.insert(product("p-1", "shirt")).await.unwrap();

        let changes = UpdateProduct {
            price: Some(12.5),
            ..Default::default()
        };
        let updated = repo.update("p-1", changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "shirt");
        assert_eq!(updated.price, 12.5);

        assert!(repo
            .update("missing", UpdateProduct::default())
            .await
            .unwrap()
            .is_none());
    }
}
