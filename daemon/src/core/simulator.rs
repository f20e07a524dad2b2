use super::{
    assembler::AssemblerState,
    blockchain::Blockchain,
    error::BlockchainError,
    storage::Storage,
};
use chainsim_common::{
    block::BlockNumber,
    tokio::{
        select,
        sync::watch,
        time::{interval, MissedTickBehavior},
    },
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Simulator {
    // Produce one block every block time
    Interval,
    // Produce blocks only when asked to
    Manual,
}

impl FromStr for Simulator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "interval" | "0" => Self::Interval,
            "manual" | "1" => Self::Manual,
            _ => return Err("Invalid simulator type".into()),
        })
    }
}

impl Serialize for Simulator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'a> Deserialize<'a> for Simulator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let s = String::deserialize(deserializer)?;
        Simulator::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Display for Simulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match &self {
            Self::Interval => "interval",
            Self::Manual => "manual",
        };
        write!(f, "{}", str)
    }
}

impl Simulator {
    // Run the tick loop until `shutdown` turns true or its sender is dropped
    // In manual mode it only waits for the shutdown signal
    pub async fn start<S: Storage>(
        &self,
        blockchain: Arc<Blockchain<S>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        if *self == Self::Manual {
            if log::log_enabled!(log::Level::Info) {
                info!("Manual simulator started, blocks are produced on demand");
            }
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            return;
        }

        let millis_interval = blockchain.get_config().block_time_ms;
        let mut interval = interval(Duration::from_millis(millis_interval));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        interval.tick().await;

        if log::log_enabled!(log::Level::Info) {
            info!("Interval simulator started, one block every {}ms", millis_interval);
        }

        loop {
            select! {
                _ = interval.tick() => {
                    let state = blockchain.get_assembler_state();
                    if state != AssemblerState::Idle {
                        debug!("previous cycle still {}, the tick waits for it", state);
                    }
                    if let Err(e) = blockchain.produce_block().await {
                        if log::log_enabled!(log::Level::Error) {
                            error!("Error while producing block: {}", e);
                        }
                    }
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if log::log_enabled!(log::Level::Info) {
            info!("Simulator stopped");
        }
    }

    // Run `count` cycles right now and return the produced block numbers
    pub async fn advance<S: Storage>(
        blockchain: &Blockchain<S>,
        count: usize,
    ) -> Result<Vec<BlockNumber>, BlockchainError> {
        debug!("advancing {} blocks", count);
        let mut numbers = Vec::with_capacity(count);
        for _ in 0..count {
            numbers.push(blockchain.produce_block().await?.get_number());
        }
        Ok(numbers)
    }
}
