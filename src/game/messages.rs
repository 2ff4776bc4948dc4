//! Bounded, colour-tagged log of player-facing messages.

use crate::config::MESSAGE_LOG_CAPACITY;
use crate::ecs::Color;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One line of the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
}

/// Message history, oldest first. Adding past capacity evicts the oldest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    /// Creates an empty log holding [`MESSAGE_LOG_CAPACITY`] lines.
    pub fn new() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends a message, dropping the oldest once the log is over capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{Color, MessageLog};
    ///
    /// let mut log = MessageLog::with_capacity(2);
    /// log.add_message("one", Color::WHITE);
    /// log.add_message("two", Color::WHITE);
    /// log.add_message("three", Color::WHITE);
    /// let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
    /// assert_eq!(texts, ["two", "three"]);
    /// ```
    pub fn add_message(&mut self, text: impl Into<String>, color: Color) {
        let text = text.into();
        log::debug!("message: {}", text);
        self.messages.push_back(Message { text, color });
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// Whether any retained message has exactly this text.
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.text == text)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
