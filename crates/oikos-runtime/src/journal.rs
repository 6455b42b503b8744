//! Journal sink
//!
//! Append-only records of per-tick economics, inference calls, births,
//! shocks, and tombstones. The core emits plain structured records;
//! [`JsonlJournal`] writes one JSON line per record under a log
//! directory, and [`NullJournal`] discards everything. Journal failures
//! are logged and swallowed by callers; persistence problems never kill
//! an agent.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use oikos_common::{AgentId, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::decision::EmergentFlag;
use crate::survival::death::Tombstone;

/// Per-agent, per-tick economics rollup
#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub agent_id: AgentId,
    pub name: String,
    pub earnings: Decimal,
    pub costs: Decimal,
    pub losses: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
    pub events: Vec<String>,
}

/// One decision call
#[derive(Debug, Clone, Serialize)]
pub struct InferenceRecord {
    pub tick: u64,
    pub agent_id: AgentId,
    pub generation: u32,
    pub strategy_id: String,
    pub reasoning: String,
    pub confidence: f64,
    pub emotion: String,
    pub fee: Decimal,
    pub flags: Vec<EmergentFlag>,
}

/// Offspring creation
#[derive(Debug, Clone, Serialize)]
pub struct BirthRecord {
    pub tick: u64,
    pub agent_id: AgentId,
    pub name: String,
    pub parent_a: Option<AgentId>,
    pub parent_b: Option<AgentId>,
    pub generation: u32,
    pub initial_balance: Decimal,
}

/// Population-wide shock
#[derive(Debug, Clone, Serialize)]
pub struct ShockRecord {
    pub tick: u64,
    pub kind: String,
}

/// Append-only record sink
#[async_trait]
pub trait Journal: Send + Sync {
    async fn tick(&self, record: &TickRecord) -> Result<()>;
    async fn inference(&self, record: &InferenceRecord) -> Result<()>;
    async fn birth(&self, record: &BirthRecord) -> Result<()>;
    async fn tombstone(&self, record: &Tombstone) -> Result<()>;
    async fn shock(&self, record: &ShockRecord) -> Result<()>;
}

/// One-JSON-line-per-record journal under a directory
pub struct JsonlJournal {
    dir: PathBuf,
}

impl JsonlJournal {
    /// Create the journal, making the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    async fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut handle = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file))
            .await?;
        handle.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl Journal for JsonlJournal {
    async fn tick(&self, record: &TickRecord) -> Result<()> {
        self.append("ticks.jsonl", record).await
    }

    async fn inference(&self, record: &InferenceRecord) -> Result<()> {
        self.append("inferences.jsonl", record).await
    }

    async fn birth(&self, record: &BirthRecord) -> Result<()> {
        self.append("births.jsonl", record).await
    }

    async fn tombstone(&self, record: &Tombstone) -> Result<()> {
        self.append("tombstones.jsonl", record).await
    }

    async fn shock(&self, record: &ShockRecord) -> Result<()> {
        self.append("shocks.jsonl", record).await
    }
}

/// Discards every record
pub struct NullJournal;

#[async_trait]
impl Journal for NullJournal {
    async fn tick(&self, _record: &TickRecord) -> Result<()> {
        Ok(())
    }

    async fn inference(&self, _record: &InferenceRecord) -> Result<()> {
        Ok(())
    }

    async fn birth(&self, _record: &BirthRecord) -> Result<()> {
        Ok(())
    }

    async fn tombstone(&self, _record: &Tombstone) -> Result<()> {
        Ok(())
    }

    async fn shock(&self, _record: &ShockRecord) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_jsonl_journal_appends_lines() {
        let dir = std::env::temp_dir().join(format!("oikos-journal-{}", uuid::Uuid::new_v4()));
        let journal = JsonlJournal::new(&dir).unwrap();

        let record = ShockRecord {
            tick: 3,
            kind: "market_crash".to_string(),
        };
        journal.shock(&record).await.unwrap();
        journal.shock(&record).await.unwrap();

        let content = std::fs::read_to_string(dir.join("shocks.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("market_crash"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_null_journal_accepts_everything() {
        let journal = NullJournal;
        let record = ShockRecord {
            tick: 1,
            kind: "plague".to_string(),
        };
        assert!(journal.shock(&record).await.is_ok());
    }
}
