//! Token usage and cost accounting.

use serde::{Deserialize, Serialize};

use super::event::StepFinishPart;

/// Accumulated token usage for one generation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
    /// Running cost in USD as reported by the server.
    pub cost: f64,
}

impl Usage {
    /// Fold one step-accounting part into the running totals.
    pub fn add_step(&mut self, step: &StepFinishPart) {
        self.input_tokens += step.tokens.input;
        self.output_tokens += step.tokens.output;
        self.reasoning_tokens += step.tokens.reasoning;
        self.cache_read_tokens += step.tokens.cache.read;
        self.cache_write_tokens += step.tokens.cache.write;
        self.cost += step.cost;
    }

    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.reasoning_tokens += other.reasoning_tokens;
        self.cache_read_tokens += other.cache_read_tokens;
        self.cache_write_tokens += other.cache_write_tokens;
        self.cost += other.cost;
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens + self.reasoning_tokens
    }
}
