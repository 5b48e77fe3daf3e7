use surrealdb::{Surreal, engine::any::Any};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::{consts::store_const::LOG_TABLE, models::log::LogEntry, utils::time};

/// Appends an audit entry on a detached task. The primary operation has
/// already committed by the time this runs; a failed write is traced and
/// dropped, never surfaced to the caller.
pub fn record(
    db: Surreal<Any>,
    user_id: impl Into<String>,
    action: impl Into<String>,
) -> JoinHandle<()> {
    let entry = LogEntry {
        user_id: user_id.into(),
        action: action.into(),
        timestamp: time::now_rfc3339(),
    };

    tokio::spawn(async move {
        let written: Result<Option<LogEntry>, surrealdb::Error> =
            db.create(LOG_TABLE).content(entry.clone()).await;
        if let Err(err) = written {
            warn!(
                user_id = %entry.user_id,
                action = %entry.action,
                error = %err,
                "audit log write failed"
            );
        }
    })
}
