//! Product domain operations.
//!
//! Every operation writes its steps to the request's detail trace: the
//! command with its filter or input, then the store's answer.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use service_core::{CoreError, DetailLog};

use crate::model::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

const COMPONENT: &str = "ProductService";

pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Stores a new product and returns its generated id.
    pub async fn insert_product(
        &self,
        input: CreateProduct,
        detail: &DetailLog,
    ) -> Result<String, CoreError> {
        detail.add_detail(COMPONENT, "insertProduct", None);

        let now = chrono::Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            price: input.price,
            description: input.description,
            image: input.image,
            create_by: "admin".to_string(),
            update_by: "admin".to_string(),
            created_at: now,
            updated_at: now,
            delete_date: None,
        };
        let id = product.id.clone();

        self.repository
            .insert(product.clone())
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail
            .add_response_body(COMPONENT, "insertProduct", to_value(&product))
            .end();
        Ok(id)
    }

    pub async fn find_all_products(
        &self,
        filter: &ProductFilter,
        limit: usize,
        detail: &DetailLog,
    ) -> Result<Vec<Product>, CoreError> {
        let cmd = "findAllProduct";
        detail.add_detail(COMPONENT, cmd, Some(&filter_message(filter)));

        let products = self
            .repository
            .find_all(filter, limit)
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, to_value(&products));
        Ok(products)
    }

    pub async fn count_products(
        &self,
        filter: &ProductFilter,
        detail: &DetailLog,
    ) -> Result<usize, CoreError> {
        let cmd = "countProduct";
        detail.add_detail(COMPONENT, cmd, Some(&filter_message(filter)));

        let count = self
            .repository
            .count(filter)
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, json!(count));
        Ok(count)
    }

    pub async fn find_product_by_id(
        &self,
        id: &str,
        detail: &DetailLog,
    ) -> Result<Option<Product>, CoreError> {
        let cmd = "findProductById";
        detail.add_detail(COMPONENT, cmd, Some(id));

        let product = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, to_value(&product));
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: &str,
        changes: UpdateProduct,
        detail: &DetailLog,
    ) -> Result<Option<Product>, CoreError> {
        let cmd = "updateProduct";
        detail.add_detail(COMPONENT, cmd, Some(id));

        let updated = self
            .repository
            .update(id, changes)
            .await
            .map_err(|err| CoreError::Handler(err.to_string()))?;

        detail.add_response_body(COMPONENT, cmd, to_value(&updated));
        Ok(updated)
    }
}

fn filter_message(filter: &ProductFilter) -> String {
    serde_json::to_string(filter).unwrap_or_default()
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryProductRepository;
    use service_core::sink::MemorySink;
    use service_core::CorrelationContext;

    fn detail(sink: std::sync::Arc<MemorySink>) -> DetailLog {
        let context = CorrelationContext {
            transaction_id: "txn-svc".to_string(),
            bearer_token: String::new(),
        };
        DetailLog::open("product-service", &context, sink)
    }

    fn input(name: &str) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            price: 9.99,
            description: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_insert_product_generates_an_id_and_ends_the_trace() {
        let sink = MemorySink::new();
        let detail = detail(sink.clone());
        let service = ProductService::new(Arc::new(MemoryProductRepository::new()));

        let id = service.insert_product(input("shirt"), &detail).await.unwrap();
        assert!(!id.is_empty());
        assert!(detail.is_closed());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        let entries = records[0]["entries"].as_array().unwrap();
        assert_eq!(entries[0]["operation"], "insertProduct");
        assert_eq!(entries[1]["payload"]["name"], "shirt");
    }

    #[tokio::test]
    async fn test_queries_trace_the_filter_without_ending_the_record() {
        let sink = MemorySink::new();
        let detail = detail(sink.clone());
        let repository = Arc::new(MemoryProductRepository::new());
        let service = ProductService::new(repository);

        let filter = ProductFilter {
            name: Some("shirt".to_string()),
            price: None,
        };
        let count = service.count_products(&filter, &detail).await.unwrap();
        let products = service.find_all_products(&filter, 10, &detail).await.unwrap();

        assert_eq!(count, 0);
        assert!(products.is_empty());
        assert!(!detail.is_closed());

        let steps = detail.steps();
        assert_eq!(steps[0].1, "countProduct");
        assert_eq!(steps[2].1, "findAllProduct");
    }
}
