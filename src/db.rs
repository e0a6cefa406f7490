// src/db.rs

mod audit_repo;
mod masterdata_repo;
mod outbox_repo;
mod repair_repo;
mod report_repo;
mod session_repo;
mod user_repo;

pub use audit_repo::AuditRepository;
pub use masterdata_repo::MasterDataRepository;
pub use outbox_repo::OutboxRepository;
pub use repair_repo::{ItemRow, NewRepair, RepairRepository, TrackingRow};
pub use report_repo::{IncomeRow, ReportRepository};
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
