use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::Result;

use crate::protocol::Willingness;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub hello_interval: u64, // seconds
    pub tc_interval: u64,    // seconds
    pub willingness: Willingness,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            hello_interval: 2,
            tc_interval: 5,
            willingness: Willingness::Default,
        }
    }
}

impl NodeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.hello_interval == 0 {
            anyhow::bail!("hello_interval must be greater than zero");
        }
        if self.tc_interval == 0 {
            anyhow::bail!("tc_interval must be greater than zero");
        }
        Ok(())
    }

    pub fn with_hello_interval(mut self, secs: u64) -> Self {
        self.hello_interval = secs;
        self
    }

    pub fn with_tc_interval(mut self, secs: u64) -> Self {
        self.tc_interval = secs;
        self
    }

    pub fn with_willingness(mut self, willingness: Willingness) -> Self {
        self.willingness = willingness;
        self
    }

    pub fn hello_period(&self) -> Duration {
        Duration::from_secs(self.hello_interval)
    }

    pub fn tc_period(&self) -> Duration {
        Duration::from_secs(self.tc_interval)
    }
}
