//! Movement history and CSV export

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{DateRange, Direction, MovementRecord};
use crate::store::InventoryStore;

/// Reporting service for the movement ledger
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn InventoryStore>,
}

/// Movement history filters. Missing dates default to the last
/// `history_days` days.
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub direction: Option<Direction>,
    pub user: Option<String>,
    pub format: Option<String>,
}

impl MovementQuery {
    pub fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }

    fn range(&self, today: NaiveDate, history_days: i64) -> DateRange {
        let default = DateRange::last_days(today, history_days);
        DateRange::new(
            self.from.unwrap_or(default.start),
            self.to.unwrap_or(default.end),
        )
    }
}

/// Flat movement row for spreadsheet export
#[derive(Debug, Serialize)]
struct MovementCsvRow<'a> {
    occurred_at: String,
    product_code: &'a str,
    direction: &'static str,
    quantity: i64,
    tier: &'static str,
    user: &'a str,
    order_reference: &'a str,
}

impl ReportingService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Movements matching the query, newest first
    pub async fn movement_history(
        &self,
        query: &MovementQuery,
        history_days: i64,
    ) -> AppResult<Vec<MovementRecord>> {
        let range = query.range(Utc::now().date_naive(), history_days);
        if range.start > range.end {
            return Err(AppError::ValidationError(format!(
                "date range starts after it ends ({} > {})",
                range.start, range.end
            )));
        }

        let user = query.user.as_deref().map(str::trim).filter(|u| !u.is_empty());
        let mut movements: Vec<MovementRecord> = self
            .store
            .read_movements()
            .await?
            .into_iter()
            .filter(|m| range.contains(m.occurred_at))
            .filter(|m| query.direction.map_or(true, |d| m.direction == d))
            .filter(|m| user.map_or(true, |u| m.user.eq_ignore_ascii_case(u)))
            .collect();
        movements.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        Ok(movements)
    }

    pub fn movements_to_csv(movements: &[MovementRecord]) -> AppResult<String> {
        let rows: Vec<MovementCsvRow> = movements
            .iter()
            .map(|m| MovementCsvRow {
                occurred_at: m.occurred_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                product_code: &m.product_code,
                direction: m.direction.as_str(),
                quantity: m.quantity,
                tier: m.tier.as_str(),
                user: &m.user,
                order_reference: &m.order_reference,
            })
            .collect();
        Self::export_to_csv(&rows)
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn movement(days_ago: i64, user: &str, code: &str) -> MovementRecord {
        MovementRecord {
            id: Uuid::new_v4(),
            occurred_at: Utc::now() - Duration::days(days_ago),
            product_code: code.to_string(),
            direction: Direction::Outbound,
            quantity: 2,
            tier: Tier::Finished,
            user: user.to_string(),
            order_reference: "ORD20240101120000".to_string(),
        }
    }

    async fn service(movements: Vec<MovementRecord>) -> ReportingService {
        let store = MemoryStore::new(vec![], vec![]);
        for m in &movements {
            store.append_movement(m).await.unwrap();
        }
        ReportingService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_history_defaults_to_recent_newest_first() {
        let service = service(vec![
            movement(3, "ana", "X1"),
            movement(45, "ana", "X2"),
            movement(1, "luis", "X3"),
        ])
        .await;

        let history = service
            .movement_history(&MovementQuery::default(), 30)
            .await
            .unwrap();
        let codes: Vec<_> = history.iter().map(|m| m.product_code.as_str()).collect();
        assert_eq!(codes, vec!["X3", "X1"]);
    }

    #[tokio::test]
    async fn test_history_user_filter() {
        let service = service(vec![movement(3, "ana", "X1"), movement(1, "luis", "X3")]).await;
        let query = MovementQuery {
            user: Some("ANA".to_string()),
            ..Default::default()
        };
        let history = service.movement_history(&query, 30).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_code, "X1");
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let service = service(vec![]).await;
        let query = MovementQuery {
            from: NaiveDate::from_ymd_opt(2024, 2, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(service.movement_history(&query, 30).await.is_err());
    }

    #[test]
    fn test_movements_to_csv() {
        let mut record = movement(0, "ana", "X1");
        record.occurred_at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();

        let csv = ReportingService::movements_to_csv(&[record]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("occurred_at,product_code,direction,quantity,tier,user,order_reference")
        );
        assert_eq!(
            lines.next(),
            Some("2024-03-05 09:30:00,X1,outbound,2,finished,ana,ORD20240101120000")
        );
    }

    #[test]
    fn test_wants_csv() {
        let query = MovementQuery {
            format: Some("CSV".to_string()),
            ..Default::default()
        };
        assert!(query.wants_csv());
        assert!(!MovementQuery::default().wants_csv());
    }
}
