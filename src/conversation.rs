//! Append-only conversation log backing the chat screen

use chrono::Local;

use crate::models::{Message, NewMessage};

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp and append a message, returning the id it was given
    pub fn append(&mut self, message: NewMessage) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text: message.text,
            sender: message.sender,
            timestamp: Local::now(),
            diagnosis: message.diagnosis,
        });
        id
    }

    /// All messages, oldest first
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
