//! Instrument Context
//!
//! Symbol metadata as reported by the venue and the validated subset the
//! sizing calculator needs.

mod metadata;

pub use metadata::{InstrumentMetadata, MetadataError, SymbolInfo, decimal_digits};
