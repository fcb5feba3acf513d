use garuda_bars::BarInterval;
use garuda_oms::{RiskConfig, RouterConfig};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Pre-trade risk gate settings
    pub risk: RiskConfig,
    /// Order routing defaults (product type, validity, exchange)
    pub router: RouterConfig,
    /// Bar grid width for the tick aggregators
    pub bar_interval: BarInterval,
    /// Capacity of the completed-bar broadcast channel
    pub bar_channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            risk: RiskConfig::default(),
            router: RouterConfig::default(),
            bar_interval: BarInterval::minutes(5),
            bar_channel_capacity: 256,
        }
    }
}
