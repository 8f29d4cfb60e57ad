//! Correlation Resolver
//!
//! Finds a trade by its correlation tag in the venue's live books. Nothing
//! is mirrored locally; every call lists pending orders and open positions
//! again.
//!
//! Records are concatenated pending orders first, then open positions, each
//! in the venue's own order. The first record whose comment equals the tag
//! wins. A tag carried by both a pending order and a position therefore
//! resolves to the pending order.

use super::VenueSession;
use crate::domain::shared::{CorrelationTag, Symbol};
use crate::domain::trade::{OpenPosition, TradeRecord};
use crate::error::EngineError;

/// Resolves correlation tags against live venue state.
#[derive(Debug, Clone)]
pub struct CorrelationResolver {
    session: VenueSession,
}

impl CorrelationResolver {
    /// Create a resolver over `session`.
    #[must_use]
    pub const fn new(session: VenueSession) -> Self {
        Self { session }
    }

    /// All pending orders then all open positions, optionally for one symbol.
    pub async fn resolve_all(&self, symbol: Option<&Symbol>) -> Result<Vec<TradeRecord>, EngineError> {
        let pending = self.session.pending_orders(symbol).await?;
        let open = self.session.open_positions(symbol).await?;

        Ok(pending
            .into_iter()
            .map(TradeRecord::from)
            .chain(open.into_iter().map(TradeRecord::from))
            .collect())
    }

    /// First record carrying `tag`.
    pub async fn resolve(
        &self,
        tag: &CorrelationTag,
        symbol: Option<&Symbol>,
    ) -> Result<TradeRecord, EngineError> {
        let records = self.resolve_all(symbol).await?;
        let matches = records.iter().filter(|r| r.has_tag(tag)).count();

        let record = records
            .into_iter()
            .find(|r| r.has_tag(tag))
            .ok_or_else(|| EngineError::not_found(tag.clone()))?;

        if matches > 1 {
            tracing::warn!(
                tag = %tag,
                matches,
                ticket = %record.ticket,
                kind = %record.kind,
                "Tag matches several records, using the first"
            );
        }

        Ok(record)
    }

    /// First open position carrying `tag`; pending orders are not considered.
    pub async fn resolve_open(
        &self,
        tag: &CorrelationTag,
        symbol: Option<&Symbol>,
    ) -> Result<OpenPosition, EngineError> {
        self.session
            .open_positions(symbol)
            .await?
            .into_iter()
            .find(|p| p.comment == tag.as_str())
            .ok_or_else(|| EngineError::not_found(tag.clone()))
    }
}
