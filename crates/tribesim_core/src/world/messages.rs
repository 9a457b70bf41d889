use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tribesim_data::{GroupId, OrganismId};

/// A two-symbol utterance broadcast by an organism.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Message {
    pub sender: OrganismId,
    pub group: Option<GroupId>,
    pub symbols: [u8; 2],
    pub position: Vec3,
    pub time: f32,
}

/// Bounded ring of recent messages; the oldest entry is overwritten first.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<Message>,
    capacity: usize,
    total: u64,
}

impl MessageLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, message: Message) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
        self.total += 1;
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages ever sent, including those already overwritten.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(n: u8) -> Message {
        Message {
            sender: OrganismId::new(u32::from(n), 0),
            group: None,
            symbols: [n, n],
            position: Vec3::ZERO,
            time: f32::from(n),
        }
    }

    #[test]
    fn test_ring_overwrites_oldest() {
        let mut log = MessageLog::new(3);
        for n in 0..5 {
            log.push(message(n));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total(), 5);
        let symbols: Vec<u8> = log.iter().map(|m| m.symbols[0]).collect();
        assert_eq!(symbols, vec![2, 3, 4]);
    }
}
