//! Conversation memory: a bounded message history plus an in-memory store of
//! past exchanges searched for prompt context.

use std::collections::VecDeque;

use {jarvis_agents::ChatMessage, jarvis_config::MemoryConfig};

/// A stored exchange with the mode and language it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    pub content: String,
    pub mode: String,
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub short_term_messages: usize,
    pub short_term_limit: usize,
    pub long_term_entries: usize,
    pub backend: &'static str,
}

#[derive(Debug)]
pub struct MemoryManager {
    short_term: VecDeque<ChatMessage>,
    short_term_limit: usize,
    long_term: Option<VecDeque<MemoryEntry>>,
    long_term_limit: usize,
}

impl MemoryManager {
    /// A zero short-term limit still keeps the latest message, so the user's
    /// question always reaches the model.
    #[must_use]
    pub fn new(config: &MemoryConfig) -> Self {
        let long_term_enabled = config.long_term && config.long_term_limit > 0;
        Self {
            short_term: VecDeque::new(),
            short_term_limit: config.short_term_limit.max(1),
            long_term: long_term_enabled.then(VecDeque::new),
            long_term_limit: config.long_term_limit,
        }
    }

    /// Append to the history, dropping the oldest messages past the limit.
    pub fn push(&mut self, message: ChatMessage) {
        self.short_term.push_back(message);
        while self.short_term.len() > self.short_term_limit {
            self.short_term.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.short_term.iter()
    }

    pub fn clear_short_term(&mut self) {
        self.short_term.clear();
    }

    /// Store an exchange. Blank content is ignored, as is everything when
    /// long-term memory is disabled.
    pub fn remember(&mut self, entry: MemoryEntry) {
        let Some(store) = self.long_term.as_mut() else {
            return;
        };
        if entry.content.trim().is_empty() {
            return;
        }
        store.push_back(entry);
        while store.len() > self.long_term_limit {
            store.pop_front();
        }
    }

    /// Case-insensitive substring search, oldest match first, at most `k`
    /// results.
    #[must_use]
    pub fn search(&self, query: &str, k: usize) -> Vec<&MemoryEntry> {
        let query = query.trim().to_lowercase();
        let Some(store) = self.long_term.as_ref() else {
            return Vec::new();
        };
        if query.is_empty() {
            return Vec::new();
        }
        store
            .iter()
            .filter(|e| e.content.to_lowercase().contains(&query))
            .take(k)
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            short_term_messages: self.short_term.len(),
            short_term_limit: self.short_term_limit,
            long_term_entries: self.long_term.as_ref().map_or(0, VecDeque::len),
            backend: if self.long_term.is_some() {
                "in-memory"
            } else {
                "disabled"
            },
        }
    }
}
