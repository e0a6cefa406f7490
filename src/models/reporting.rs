// src/models/reporting.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::repair::RepairStatus;

/// One repair as it appears on the income report. `received`/`balance` are
/// derived, not stored: a delivered repair counts in full, anything else only
/// its advance.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReportRow {
    pub repair_id: Uuid,
    pub bill_no: String,
    pub client_name: String,
    pub status: RepairStatus,
    pub estimated_delivery_date: NaiveDate,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    pub balance_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReportSummary {
    pub repair_count: i64,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    pub balance_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    pub rows: Vec<IncomeReportRow>,
    pub summary: IncomeReportSummary,
}

/// Amount actually received for a repair in its current status.
pub fn received_amount(status: RepairStatus, total: Decimal, advance: Decimal) -> Decimal {
    if status == RepairStatus::Delivered { total } else { advance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn delivered_repairs_count_in_full() {
        assert_eq!(
            received_amount(RepairStatus::Delivered, dec!(6500), dec!(2500)),
            dec!(6500)
        );
    }

    #[test]
    fn undelivered_repairs_count_only_the_advance() {
        for status in [
            RepairStatus::Pending,
            RepairStatus::Processing,
            RepairStatus::RepairCompleted,
        ] {
            assert_eq!(received_amount(status, dec!(6500), dec!(2500)), dec!(2500));
        }
    }
}
