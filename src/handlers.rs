pub mod auth;
pub mod masterdata;
pub mod repairs;
pub mod reports;
pub mod sms;
pub mod tracking;
pub mod users;
