use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use shared::models::network::Network;
use shared::models::staker::StakerRole;

use crate::ports::SelectionStore;
use crate::store::core::RedisStore;

const SELECTION_BASE_KEY: &str = "stakers:selected";

/// Durable selection flags keyed by (role, network). An absent key reads as
/// "not selected".
pub struct RedisSelectionStore {
    redis: Arc<RedisStore>,
}

impl RedisSelectionStore {
    pub fn new(redis: Arc<RedisStore>) -> Self {
        Self { redis }
    }

    fn selection_key(role: StakerRole, network: Network) -> String {
        format!("{}:{}:{}", SELECTION_BASE_KEY, role, network)
    }
}

#[async_trait]
impl SelectionStore for RedisSelectionStore {
    async fn get(&self, role: StakerRole, network: Network) -> Result<bool> {
        let mut con = self.redis.client.get_multiplexed_async_connection().await?;
        let value: Option<bool> = con.get(Self::selection_key(role, network)).await?;
        Ok(value.unwrap_or(false))
    }

    async fn set(&self, role: StakerRole, network: Network, value: bool) -> Result<()> {
        let mut con = self.redis.client.get_multiplexed_async_connection().await?;
        let _: () = con.set(Self::selection_key(role, network), value).await?;
        Ok(())
    }
}
