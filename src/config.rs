// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{
        AuditRepository, MasterDataRepository, OutboxRepository, RepairRepository,
        ReportRepository, SessionRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        masterdata::MasterDataService,
        repair::RepairService,
        reporting::ReportingService,
        sms::{HttpSmsProvider, SmsProvider},
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_OUTBOX_POLL_SECS: u64 = 30;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub bind_addr: String,
    pub outbox_poll_interval: Duration,
    pub auth_service: AuthService,
    pub masterdata_service: MasterDataService,
    pub repair_service: Arc<RepairService>,
    pub reporting_service: ReportingService,
    pub outbox_repo: OutboxRepository,
    pub sms_provider: Arc<dyn SmsProvider>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let tracking_base_url = env::var("PUBLIC_TRACKING_BASE_URL")
            .map_err(|_| anyhow::anyhow!("PUBLIC_TRACKING_BASE_URL must be set"))?;
        let sms_api_url =
            env::var("SMS_API_URL").map_err(|_| anyhow::anyhow!("SMS_API_URL must be set"))?;
        let sms_api_key =
            env::var("SMS_API_KEY").map_err(|_| anyhow::anyhow!("SMS_API_KEY must be set"))?;
        let sms_sender_id = env::var("SMS_SENDER_ID").unwrap_or_else(|_| "BATWORKS".into());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let outbox_poll_interval = Duration::from_secs(
            env::var("OUTBOX_POLL_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_OUTBOX_POLL_SECS),
        );

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("database connection established");

        let sms_provider: Arc<dyn SmsProvider> =
            Arc::new(HttpSmsProvider::new(sms_api_url, sms_api_key, sms_sender_id)?);

        // Dependency graph: repositories first, services on top.
        let user_repo = UserRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let masterdata_repo = MasterDataRepository::new(db_pool.clone());
        let repair_repo = RepairRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let outbox_repo = OutboxRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, session_repo, db_pool.clone());
        let masterdata_service = MasterDataService::new(masterdata_repo.clone());
        let repair_service = Arc::new(RepairService::new(
            db_pool.clone(),
            repair_repo,
            audit_repo,
            outbox_repo.clone(),
            masterdata_repo,
            sms_provider.clone(),
            tracking_base_url,
        ));
        let reporting_service = ReportingService::new(report_repo);

        Ok(Self {
            db_pool,
            bind_addr,
            outbox_poll_interval,
            auth_service,
            masterdata_service,
            repair_service,
            reporting_service,
            outbox_repo,
            sms_provider,
        })
    }
}
