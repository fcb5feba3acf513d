//! Push-stream pump workers
//!
//! Each of the venue's two push streams gets a dedicated task: the transport
//! pushes events onto a channel and a single consumer drains it, so
//! per-order ordering is preserved and no raw concurrency reaches the state
//! machine. The pumps never hold OMS locks across an await.

use std::collections::HashMap;
use std::sync::Arc;

use garuda_bars::{Bar, BarAggregator, BarInterval};
use garuda_core::InstrumentId;
use garuda_gateway::{ChannelSubscriber, OrderUpdateEvent, Subscriber, TickMessage};
use garuda_oms::{LastPriceCache, OrderReconciler};
use log::info;
use tokio::sync::broadcast;

/// Drain the order-update stream into the reconciler
pub(crate) async fn run_order_pump(
    mut updates: ChannelSubscriber<OrderUpdateEvent>,
    reconciler: Arc<OrderReconciler>,
) {
    info!("[SESSION] order update pump started");
    while let Ok(event) = updates.next().await {
        reconciler.apply(&event);
    }
    info!("[SESSION] order update pump stopped");
}

/// Drain the tick stream: refresh the last-price cache and feed the
/// per-instrument bar aggregators, publishing completed bars
pub(crate) async fn run_tick_pump(
    mut ticks: ChannelSubscriber<TickMessage>,
    last_prices: Arc<LastPriceCache>,
    interval: BarInterval,
    bars_tx: broadcast::Sender<Bar>,
) {
    info!("[SESSION] tick pump started");
    let mut aggregators: HashMap<InstrumentId, BarAggregator> = HashMap::new();

    while let Ok(tick) = ticks.next().await {
        last_prices.update(&tick.instrument_id, tick.price);

        let aggregator = aggregators.entry(tick.instrument_id.clone()).or_insert_with(|| {
            let tx = bars_tx.clone();
            BarAggregator::new(tick.instrument_id.clone(), interval, move |bar: Bar| {
                // Nobody listening is fine; bars are best-effort fan-out
                let _ = tx.send(bar);
            })
        });
        aggregator.on_tick(tick.timestamp, tick.price, tick.quantity);
    }
    info!("[SESSION] tick pump stopped");
}
