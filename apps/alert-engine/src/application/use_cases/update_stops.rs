//! Update Stop/Target Use Case

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::dto::Submission;
use crate::application::services::{CorrelationResolver, TagLocks, VenueSession};
use crate::domain::shared::CorrelationTag;
use crate::domain::trade::{OrderRequest, RecordKind};
use crate::error::{EngineError, ValidationError};

/// Use case for moving the stop loss and take profit of a tagged trade.
#[derive(Debug, Clone)]
pub struct UpdateStopsUseCase {
    session: VenueSession,
    resolver: CorrelationResolver,
    locks: Arc<TagLocks>,
}

impl UpdateStopsUseCase {
    /// Create the use case.
    #[must_use]
    pub fn new(session: VenueSession, locks: Arc<TagLocks>) -> Self {
        Self {
            resolver: CorrelationResolver::new(session.clone()),
            session,
            locks,
        }
    }

    /// Modify the record carrying `tag`. A value left out keeps the
    /// record's current one.
    pub async fn execute(
        &self,
        tag: &CorrelationTag,
        sl: Option<Decimal>,
        tp: Option<Decimal>,
    ) -> Result<Submission, EngineError> {
        if sl.is_none() && tp.is_none() {
            return Err(ValidationError::NothingToUpdate.into());
        }

        let _guard = self.locks.acquire(tag).await;
        let record = self.resolver.resolve(tag, None).await?;

        let sl = sl.or(record.stop_price);
        let tp = tp.or(record.target_price);
        let request = match record.kind {
            RecordKind::Open => OrderRequest::modify_position(&record, sl, tp),
            RecordKind::Pending => OrderRequest::modify_pending(&record, sl, tp),
        };

        let result = self.session.submit(&request).await?;
        tracing::info!(
            tag = %tag,
            ticket = %record.ticket,
            kind = %record.kind,
            sl = ?sl,
            tp = ?tp,
            "Stop/target updated"
        );
        Ok(Submission::new(&request, result))
    }
}
