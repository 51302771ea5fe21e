use {
    anyhow::{Context, Result},
    model::{order::OrderHash, order_state::OrderState},
    std::path::PathBuf,
};

/// Where order states are read from.
#[cfg_attr(test, mockall::automock)]
pub trait OrderStateSource: Send + Sync {
    fn order_states(&self) -> Result<Vec<OrderState>>;

    fn order_state(&self, hash: &OrderHash) -> Result<Option<OrderState>> {
        Ok(self
            .order_states()?
            .into_iter()
            .find(|state| state.order.order_hash == *hash))
    }
}

/// A JSON array of order states as exported by an indexer.
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OrderStateSource for SnapshotFile {
    fn order_states(&self) -> Result<Vec<OrderState>> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read snapshot {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot {}", self.path.display()))
    }
}
