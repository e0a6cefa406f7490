pub mod auth;
pub mod masterdata;
pub mod repair;
pub mod reporting;
pub mod sms;
