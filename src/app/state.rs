//! Application state shared across routes

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::feed::ItemFeed;
use crate::stats::StatsAggregator;
use crate::store::items::{LostFoundItem, ThriftItem};
use crate::store::{GatewayError, RemoteGateway, SupabaseClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stats: Arc<StatsAggregator>,
    pub lost_found: Arc<ItemFeed<LostFoundItem>>,
    pub thrift: Arc<ItemFeed<ThriftItem>>,
}

impl AppState {
    /// State backed by the configured Supabase project
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        let gateway = SupabaseClient::new(&config)?;
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    pub fn with_gateway(config: Config, gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            config: Arc::new(config),
            stats: Arc::new(StatsAggregator::new(gateway.clone())),
            lost_found: Arc::new(ItemFeed::new(gateway.clone())),
            thrift: Arc::new(ItemFeed::new(gateway)),
        }
    }

    /// Periodically reload both feeds so items posted elsewhere show up
    pub async fn run_feed_refresh(self, period: Duration) {
        info!(period_secs = period.as_secs(), "Starting background feed refresh");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tokio::join!(self.lost_found.load(), self.thrift.load());
        }
    }
}
