use garuda_core::{ExchangeSegment, InstrumentMeta};

/// Instrument metadata source.
///
/// Backed by whatever instrument store the deployment uses; absence of an
/// entry is expected and handled by callers (the risk gate warns and skips
/// its limit check, the router falls back to configured defaults).
pub trait InstrumentLookup: Send + Sync {
    fn lookup(&self, symbol: &str, segment: ExchangeSegment) -> Option<InstrumentMeta>;
}
