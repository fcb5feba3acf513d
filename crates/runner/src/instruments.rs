//! In-memory instrument table
//!
//! The deployment's instrument store (database, scrip master download) is an
//! external collaborator; sessions only need lookups. This table is built at
//! startup and shared read-only.

use std::collections::HashMap;

use garuda_core::{ExchangeSegment, InstrumentMeta};
use garuda_ports::InstrumentLookup;

#[derive(Default)]
pub struct InstrumentTable {
    by_key: HashMap<(String, ExchangeSegment), InstrumentMeta>,
}

impl InstrumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a metadata listing
    pub fn with_instruments(instruments: impl IntoIterator<Item = InstrumentMeta>) -> Self {
        let mut table = Self::new();
        for meta in instruments {
            table.insert(meta);
        }
        table
    }

    pub fn insert(&mut self, meta: InstrumentMeta) {
        self.by_key.insert((meta.symbol.clone(), meta.exchange), meta);
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl InstrumentLookup for InstrumentTable {
    fn lookup(&self, symbol: &str, segment: ExchangeSegment) -> Option<InstrumentMeta> {
        self.by_key.get(&(symbol.to_string(), segment)).cloned()
    }
}
