//! In-memory message catalog.
//!
//! Every user-facing string (success texts and error texts alike) is looked
//! up here by code. The catalog holds an immutable snapshot behind a
//! reader-writer lock: lookups clone the snapshot pointer and release the
//! lock immediately, a reload builds the replacement map without holding
//! the lock and only takes the write side for the pointer swap.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Positional placeholders in message content: `${0}`, `${1}`, ...
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\d+)\}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Error,
    Success,
    Warning,
    Info,
    Debug,
    /// Reported for codes the catalog does not know. Never persisted.
    Unknown,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Error => "ERROR",
            MessageType::Success => "SUCCESS",
            MessageType::Warning => "WARNING",
            MessageType::Info => "INFO",
            MessageType::Debug => "DEBUG",
            MessageType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the persisted forms. `UNKNOWN` is not one of them.
impl FromStr for MessageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(MessageType::Error),
            "SUCCESS" => Ok(MessageType::Success),
            "WARNING" => Ok(MessageType::Warning),
            "INFO" => Ok(MessageType::Info),
            "DEBUG" => Ok(MessageType::Debug),
            _ => Err(CoreError::InvalidMessageType(s.to_string())),
        }
    }
}

/// One active message as the catalog stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: String,
    pub message_type: MessageType,
    pub content: String,
}

/// Where the catalog reads its messages from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// All messages currently flagged active.
    async fn active_messages(&self) -> Result<Vec<CatalogEntry>, CoreError>;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable view of the catalog at one generation.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    generation: u64,
    entries: HashMap<String, (MessageType, String)>,
}

impl CatalogSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content for `code`, or `code` itself when absent.
    pub fn get(&self, code: &str) -> String {
        self.entries
            .get(code)
            .map(|(_, content)| content.clone())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn get_typed(&self, code: &str) -> (MessageType, String) {
        self.entries
            .get(code)
            .cloned()
            .unwrap_or_else(|| (MessageType::Unknown, code.to_string()))
    }

    /// Content for `code` with `${n}` replaced by `args[n]`.
    ///
    /// Placeholders without a matching argument are left untouched.
    pub fn format(&self, code: &str, args: &[String]) -> String {
        let content = self.get(code);
        if args.is_empty() {
            return content;
        }
        PLACEHOLDER_RE
            .replace_all(&content, |caps: &regex::Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| args.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Process-wide message catalog. Constructed by the composition root and
/// shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    current: RwLock<Arc<CatalogSnapshot>>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the catalog with every active message from `source`.
    ///
    /// On failure the previous snapshot stays in place. Returns the number
    /// of messages now cached.
    pub async fn load(&self, source: &dyn MessageSource) -> Result<usize, CoreError> {
        let messages = source.active_messages().await.map_err(|err| {
            tracing::error!(error = %err, "Failed to load message catalog");
            CoreError::MessageCatalogLoadFailed(err.to_string())
        })?;

        let mut entries = HashMap::with_capacity(messages.len());
        for message in messages {
            if message.code.trim().is_empty() {
                tracing::warn!("Skipping message with empty code");
                continue;
            }
            entries.insert(message.code, (message.message_type, message.content));
        }
        let count = entries.len();

        let generation = {
            let mut current = self.current.write();
            let generation = current.generation + 1;
            *current = Arc::new(CatalogSnapshot {
                generation,
                entries,
            });
            generation
        };

        tracing::info!(count, generation, "Message catalog loaded");
        Ok(count)
    }

    /// Same as [`MessageCatalog::load`]; called after bulk message edits.
    pub async fn reload(&self, source: &dyn MessageSource) -> Result<usize, CoreError> {
        self.load(source).await
    }

    /// The current snapshot. Holding it keeps a consistent view across
    /// several lookups even if a reload happens meanwhile.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    pub fn get(&self, code: &str) -> String {
        self.snapshot().get(code)
    }

    pub fn get_typed(&self, code: &str) -> (MessageType, String) {
        self.snapshot().get_typed(code)
    }

    pub fn format(&self, code: &str, args: &[String]) -> String {
        self.snapshot().format(code, args)
    }

    pub fn count(&self) -> usize {
        self.snapshot().len()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}
