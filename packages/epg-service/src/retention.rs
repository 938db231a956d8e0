//! Periodic eviction of aged suggestion entries.
//!
//! Runs are scheduled with a fixed delay: the next run starts `interval` after the previous one
//! finished, and the first run starts immediately. Each run is its own task, so a failing or
//! panicking sweep is logged and the schedule carries on.

use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::{sync::watch, task::JoinHandle, time as tokio_time};

use crate::{EpgService, Error, Result, SuggestionIndex, bounded};

#[derive(Debug, Clone, Copy)]
pub struct RetentionSchedule {
	pub ttl: time::Duration,
	pub interval: Duration,
	pub timeout: Duration,
}
impl RetentionSchedule {
	pub fn from_config(cfg: &epg_config::Retention, timeout: Duration) -> Self {
		Self {
			ttl: time::Duration::seconds(cfg.ttl_days.saturating_mul(86_400)),
			interval: Duration::from_secs(cfg.interval_seconds),
			timeout,
		}
	}
}

/// Controls a running scheduler. Dropping the handle also stops it.
pub struct RetentionHandle {
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}
impl RetentionHandle {
	/// Stops scheduling further runs and waits for an in-flight run to finish.
	pub async fn shutdown(self) {
		let _ = self.shutdown.send(true);

		if let Err(err) = self.task.await {
			tracing::error!(error = %err, "Suggestion retention task ended abnormally.");
		}
	}

	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}

impl EpgService {
	/// Starts the retention scheduler on the current tokio runtime.
	pub fn start_retention(&self) -> RetentionHandle {
		spawn_retention(
			Arc::clone(&self.indexes.suggestions),
			RetentionSchedule::from_config(&self.cfg.retention, self.query_timeout()),
		)
	}
}

pub fn spawn_retention(
	index: Arc<dyn SuggestionIndex>,
	schedule: RetentionSchedule,
) -> RetentionHandle {
	let (shutdown, mut stop) = watch::channel(false);
	let task = tokio::spawn(async move {
		loop {
			if *stop.borrow() {
				break;
			}

			let index = Arc::clone(&index);
			let run = tokio::spawn(async move {
				sweep_once(index.as_ref(), schedule, OffsetDateTime::now_utc()).await
			});

			match run.await {
				Ok(Ok(deleted)) => tracing::info!(deleted, "Purged expired suggestions."),
				Ok(Err(err)) => tracing::error!(error = %err, "Suggestion retention sweep failed."),
				Err(err) => tracing::error!(error = %err, "Suggestion retention sweep panicked."),
			}

			tokio::select! {
				changed = stop.changed() => {
					if changed.is_err() || *stop.borrow() {
						break;
					}
				}
				_ = tokio_time::sleep(schedule.interval) => {}
			}
		}

		tracing::debug!("Suggestion retention scheduler stopped.");
	});

	RetentionHandle { shutdown, task }
}

/// Deletes every entry whose sort date is at or before `now - ttl`.
pub async fn sweep_once(
	index: &dyn SuggestionIndex,
	schedule: RetentionSchedule,
	now: OffsetDateTime,
) -> Result<u64> {
	let Some(cutoff) = now.checked_sub(schedule.ttl) else {
		// No entry can be dated before the first representable instant.
		if schedule.ttl.is_positive() {
			return Ok(0);
		}

		return Err(Error::InvalidRequest {
			message: format!("retention ttl of {} days is out of range.", schedule.ttl.whole_days()),
		});
	};

	bounded(schedule.timeout, "suggestion retention", index.delete_older_than(cutoff)).await
}
