pub mod auth;
pub mod masterdata;
pub mod outbox_worker;
pub mod repair;
pub mod reporting;
pub mod sms;
