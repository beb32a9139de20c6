//! Production order tracking

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{detect_color, Color, ProductionKind, ProductionOrder, ProductionStatus};
use crate::store::InventoryStore;

/// Production service for paint and fabricate orders
#[derive(Clone)]
pub struct ProductionService {
    store: Arc<dyn InventoryStore>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductionQuery {
    pub kind: Option<ProductionKind>,
    pub status: Option<ProductionStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductionStatusInput {
    pub status: ProductionStatus,
}

/// Quantity to produce for one description
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProductionGroup {
    pub description: String,
    pub color: Option<Color>,
    pub quantity: i64,
    pub orders: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionSummary {
    pub kind: ProductionKind,
    pub total_quantity: i64,
    pub groups: Vec<ProductionGroup>,
}

impl ProductionService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Production orders matching the query, newest first
    pub async fn list(&self, query: &ProductionQuery) -> AppResult<Vec<ProductionOrder>> {
        let mut orders: Vec<ProductionOrder> = self
            .store
            .read_production_orders()
            .await?
            .into_iter()
            .filter(|o| query.kind.map_or(true, |k| o.kind == k))
            .filter(|o| query.status.map_or(true, |s| o.status == s))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Per kind, quantities grouped by description, largest first
    pub async fn summary(&self, query: &ProductionQuery) -> AppResult<Vec<ProductionSummary>> {
        let orders = self.list(query).await?;

        let kinds = match query.kind {
            Some(kind) => vec![kind],
            None => vec![ProductionKind::Paint, ProductionKind::Fabricate],
        };

        let summaries = kinds
            .into_iter()
            .map(|kind| {
                let mut groups: HashMap<&str, ProductionGroup> = HashMap::new();
                for order in orders.iter().filter(|o| o.kind == kind) {
                    let group = groups
                        .entry(order.description.as_str())
                        .or_insert_with(|| ProductionGroup {
                            description: order.description.clone(),
                            color: detect_color(&order.description),
                            quantity: 0,
                            orders: 0,
                        });
                    group.quantity += order.quantity;
                    group.orders += 1;
                }

                let mut groups: Vec<ProductionGroup> = groups.into_values().collect();
                groups.sort_by(|a, b| {
                    b.quantity
                        .cmp(&a.quantity)
                        .then_with(|| a.description.cmp(&b.description))
                });

                ProductionSummary {
                    kind,
                    total_quantity: groups.iter().map(|g| g.quantity).sum(),
                    groups,
                }
            })
            .collect();

        Ok(summaries)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ProductionStatus,
    ) -> AppResult<ProductionOrder> {
        let mut order = self
            .store
            .read_production_orders()
            .await?
            .into_iter()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Production order {}", id)))?;

        if !order.status.can_transition_to(status) {
            return Err(AppError::InvalidStateTransition(format!(
                "production order {} cannot move from {} to {}",
                id,
                order.status.as_str(),
                status.as_str()
            )));
        }

        let moved = self
            .store
            .update_production_status(id, order.status, status)
            .await?;
        if !moved {
            return Err(AppError::InvalidStateTransition(format!(
                "production order {} changed status while moving to {}",
                id,
                status.as_str()
            )));
        }
        tracing::info!(
            "Production order {} ({}) moved to {}",
            id,
            order.kind.as_str(),
            status.as_str()
        );

        order.status = status;
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn production(kind: ProductionKind, description: &str, quantity: i64, age: i64) -> ProductionOrder {
        ProductionOrder {
            id: Uuid::new_v4(),
            created_at: Utc::now() - Duration::minutes(age),
            product_code: "X1".to_string(),
            source_code: None,
            base_key: description.to_string(),
            description: description.to_string(),
            quantity,
            requested_by: "ana".to_string(),
            order_reference: "ORD20240101120000".to_string(),
            kind,
            status: ProductionStatus::Pending,
        }
    }

    async fn service(orders: &[ProductionOrder]) -> ProductionService {
        let store = MemoryStore::new(vec![], vec![]);
        for order in orders {
            store.append_production_order(order).await.unwrap();
        }
        ProductionService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_summary_groups_by_description() {
        let service = service(&[
            production(ProductionKind::Paint, "CHAIR RED 30CM", 2, 3),
            production(ProductionKind::Paint, "CHAIR RED 30CM", 3, 2),
            production(ProductionKind::Paint, "CHAIR BLUE 30CM", 4, 1),
            production(ProductionKind::Fabricate, "TABLE 60CM", 7, 0),
        ])
        .await;

        let summary = service.summary(&ProductionQuery::default()).await.unwrap();
        assert_eq!(summary.len(), 2);

        let paint = &summary[0];
        assert_eq!(paint.kind, ProductionKind::Paint);
        assert_eq!(paint.total_quantity, 9);
        assert_eq!(
            paint.groups[0],
            ProductionGroup {
                description: "CHAIR RED 30CM".to_string(),
                color: Some(Color::Red),
                quantity: 5,
                orders: 2,
            }
        );
        assert_eq!(paint.groups[1].color, Some(Color::Blue));

        assert_eq!(summary[1].groups[0].color, None);
        assert_eq!(summary[1].total_quantity, 7);
    }

    #[tokio::test]
    async fn test_list_filters_newest_first() {
        let service = service(&[
            production(ProductionKind::Paint, "CHAIR RED 30CM", 2, 10),
            production(ProductionKind::Fabricate, "TABLE 60CM", 7, 5),
            production(ProductionKind::Paint, "CHAIR BLUE 30CM", 4, 1),
        ])
        .await;

        let query = ProductionQuery {
            kind: Some(ProductionKind::Paint),
            status: None,
        };
        let listed = service.list(&query).await.unwrap();
        let descriptions: Vec<_> = listed.iter().map(|o| o.description.as_str()).collect();
        assert_eq!(descriptions, vec!["CHAIR BLUE 30CM", "CHAIR RED 30CM"]);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let order = production(ProductionKind::Paint, "CHAIR RED 30CM", 2, 0);
        let service = service(std::slice::from_ref(&order)).await;

        let err = service
            .update_status(order.id, ProductionStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));

        let updated = service
            .update_status(order.id, ProductionStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(updated.status, ProductionStatus::InProgress);

        service
            .update_status(order.id, ProductionStatus::Done)
            .await
            .unwrap();
        let err = service
            .update_status(order.id, ProductionStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn test_concurrent_status_updates_apply_once() {
        let order = production(ProductionKind::Fabricate, "TABLE 60CM", 1, 0);
        let service = service(std::slice::from_ref(&order)).await;

        let (a, b) = tokio::join!(
            service.update_status(order.id, ProductionStatus::InProgress),
            service.update_status(order.id, ProductionStatus::InProgress),
        );
        let applied = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(applied, 1);
        assert!(matches!(
            a.err().or(b.err()),
            Some(AppError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_production_order() {
        let service = service(&[]).await;
        let err = service
            .update_status(Uuid::new_v4(), ProductionStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
