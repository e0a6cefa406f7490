// src/services/reporting.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::reporting::{IncomeReport, IncomeReportRow, IncomeReportSummary, received_amount},
};

#[derive(Clone)]
pub struct ReportingService {
    repo: ReportRepository,
}

impl ReportingService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    /// Income over a creation-date window. Received/balance are derived from
    /// status at read time; nothing here mutates.
    pub async fn income_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<IncomeReport, AppError> {
        let raw = self.repo.income_rows(from, to).await?;

        let mut total = Decimal::ZERO;
        let mut received = Decimal::ZERO;

        let rows: Vec<IncomeReportRow> = raw
            .into_iter()
            .map(|row| {
                let row_received = received_amount(row.status, row.total_amount, row.advance_amount);
                total += row.total_amount;
                received += row_received;
                IncomeReportRow {
                    repair_id: row.repair_id,
                    bill_no: row.bill_no,
                    client_name: row.client_name,
                    status: row.status,
                    estimated_delivery_date: row.estimated_delivery_date,
                    total_amount: row.total_amount,
                    received_amount: row_received,
                    balance_amount: row.total_amount - row_received,
                }
            })
            .collect();

        let summary = IncomeReportSummary {
            repair_count: rows.len() as i64,
            total_amount: total,
            received_amount: received,
            balance_amount: total - received,
        };

        Ok(IncomeReport { rows, summary })
    }
}
