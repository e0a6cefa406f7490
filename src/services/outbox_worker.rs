// src/services/outbox_worker.rs
//
// At-least-once drain loop for the SMS outbox. State changes enqueue rows
// transactionally; this worker is the only always-on consumer. Each tick
// claims a batch under FOR UPDATE SKIP LOCKED, dispatches, and records the
// outcome in the same transaction. A crash mid-batch leaves the unclaimed
// rows PENDING for the next tick.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::{
    db::OutboxRepository,
    services::sms::{SmsProvider, dispatch_with_retry},
};

const BATCH_SIZE: i64 = 10;

pub fn spawn(
    pool: PgPool,
    outbox: OutboxRepository,
    provider: Arc<dyn SmsProvider>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let Err(e) = drain_once(&pool, &outbox, provider.as_ref()).await {
                tracing::error!("outbox drain failed: {e:?}");
            }
        }
    })
}

async fn drain_once(
    pool: &PgPool,
    outbox: &OutboxRepository,
    provider: &dyn SmsProvider,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    let batch = outbox.claim_pending(&mut *tx, BATCH_SIZE).await?;
    if batch.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = batch.len(), "draining outbox batch");

    for row in batch {
        match dispatch_with_retry(provider, &row.recipient, &row.message).await {
            Ok(response) => {
                outbox.mark_sent(&mut *tx, row.id, &response).await?;
            }
            Err(e) => {
                tracing::warn!(outbox_id = %row.id, "outbox dispatch failed: {e}");
                outbox.mark_failed(&mut *tx, row.id, &e.to_string()).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(())
}
