//! Instrument Metadata Accessor
//!
//! Fetches symbol properties fresh on every call. A symbol hidden from the
//! terminal's watch list is selected first; its properties are only trusted
//! after selection succeeds.

use thiserror::Error;

use super::VenueSession;
use crate::domain::instrument::{InstrumentMetadata, MetadataError, SymbolInfo};
use crate::domain::shared::Symbol;
use crate::domain::sizing::SizingError;
use crate::error::EngineError;

/// Why metadata could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstrumentError {
    /// The venue does not know the symbol.
    #[error("symbol {symbol} not found")]
    NotFound {
        /// Symbol.
        symbol: Symbol,
    },

    /// The symbol exists but could not be added to the watch list.
    #[error("symbol {symbol} could not be selected")]
    NotSelectable {
        /// Symbol.
        symbol: Symbol,
    },

    /// Properties present but unusable for sizing.
    #[error(transparent)]
    Incomplete(#[from] MetadataError),

    /// The lookup itself failed.
    #[error(transparent)]
    Venue(EngineError),
}

impl InstrumentError {
    /// Engine error for a sizing caller: everything but venue failures
    /// means sizing cannot be computed.
    #[must_use]
    pub fn into_sizing_error(self) -> EngineError {
        match self {
            Self::Venue(err) => err,
            other => SizingError::unavailable(other.to_string()).into(),
        }
    }

    /// Engine error for a caller that only needs the venue to answer.
    #[must_use]
    pub fn into_engine_error(self) -> EngineError {
        match self {
            Self::Venue(err) => err,
            other => EngineError::VenueUnavailable {
                message: other.to_string(),
            },
        }
    }
}

/// Reads instrument metadata through the venue session.
#[derive(Debug, Clone)]
pub struct InstrumentMetadataAccessor {
    session: VenueSession,
}

impl InstrumentMetadataAccessor {
    /// Create an accessor over `session`.
    #[must_use]
    pub const fn new(session: VenueSession) -> Self {
        Self { session }
    }

    /// Symbol properties, selecting the symbol first when it is hidden.
    pub async fn symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo, InstrumentError> {
        let info = self
            .session
            .symbol_info(symbol)
            .await
            .map_err(InstrumentError::Venue)?
            .ok_or_else(|| InstrumentError::NotFound {
                symbol: symbol.clone(),
            })?;

        if info.visible {
            return Ok(info);
        }

        tracing::debug!(symbol = %symbol, "Symbol hidden, selecting");
        let selected = self
            .session
            .select_symbol(symbol)
            .await
            .map_err(InstrumentError::Venue)?;
        if !selected {
            tracing::warn!(symbol = %symbol, "Symbol selection failed");
            return Err(InstrumentError::NotSelectable {
                symbol: symbol.clone(),
            });
        }

        self.session
            .symbol_info(symbol)
            .await
            .map_err(InstrumentError::Venue)?
            .ok_or_else(|| InstrumentError::NotFound {
                symbol: symbol.clone(),
            })
    }

    /// Validated metadata for sizing.
    pub async fn metadata(&self, symbol: &Symbol) -> Result<InstrumentMetadata, InstrumentError> {
        let info = self.symbol_info(symbol).await?;
        Ok(InstrumentMetadata::from_info(info)?)
    }
}
