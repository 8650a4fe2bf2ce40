//! Self-clearing phone number errors.
//!
//! The number input widget reports format problems as they happen; each one is
//! shown for a fixed window and then disappears. A newer error replaces the
//! pending one and restarts the window. Timestamps are caller-supplied
//! milliseconds, the host decides where they come from.

use crate::form::{ContactForm, EntryId};
use crate::DEFAULT_TRANSIENT_ERROR_MS;
use std::collections::HashMap;

/// Handle for one scheduled expiry. Only the latest ticket can clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket {
    pub generation: u64,
    pub deadline_ms: u64,
}

/// Single-slot message with a replaceable expiry.
#[derive(Debug, Clone)]
pub struct TransientMessage {
    message: Option<String>,
    deadline_ms: Option<u64>,
    generation: u64,
    window_ms: u64,
}

impl Default for TransientMessage {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIENT_ERROR_MS)
    }
}

impl TransientMessage {
    pub fn new(window_ms: u64) -> Self {
        Self {
            message: None,
            deadline_ms: None,
            generation: 0,
            window_ms,
        }
    }

    /// Show `message`, cancelling whatever expiry was pending.
    pub fn show(&mut self, message: impl Into<String>, now_ms: u64) -> TimerTicket {
        self.generation += 1;
        let deadline_ms = now_ms.saturating_add(self.window_ms);
        self.message = Some(message.into());
        self.deadline_ms = Some(deadline_ms);
        TimerTicket {
            generation: self.generation,
            deadline_ms,
        }
    }

    /// Timer callback. Stale tickets are ignored. Returns whether it cleared.
    pub fn fire(&mut self, ticket: TimerTicket) -> bool {
        if ticket.generation != self.generation || self.message.is_none() {
            return false;
        }
        self.dismiss();
        true
    }

    /// Clear the message if its window has passed; returns what is still shown.
    pub fn poll(&mut self, now_ms: u64) -> Option<&str> {
        if self.deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
            self.dismiss();
        }
        self.message.as_deref()
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn dismiss(&mut self) {
        self.message = None;
        self.deadline_ms = None;
    }
}

/// One transient message per phone row.
#[derive(Debug, Clone)]
pub struct PhoneErrorBoard {
    slots: HashMap<EntryId, TransientMessage>,
    window_ms: u64,
}

impl Default for PhoneErrorBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSIENT_ERROR_MS)
    }
}

impl PhoneErrorBoard {
    pub fn new(window_ms: u64) -> Self {
        Self {
            slots: HashMap::new(),
            window_ms,
        }
    }

    pub fn report(&mut self, id: EntryId, message: impl Into<String>, now_ms: u64) -> TimerTicket {
        let window_ms = self.window_ms;
        self.slots
            .entry(id)
            .or_insert_with(|| TransientMessage::new(window_ms))
            .show(message, now_ms)
    }

    pub fn fire(&mut self, id: EntryId, ticket: TimerTicket) -> bool {
        self.slots
            .get_mut(&id)
            .is_some_and(|slot| slot.fire(ticket))
    }

    /// Expire every message whose window has passed.
    pub fn poll(&mut self, now_ms: u64) {
        for slot in self.slots.values_mut() {
            slot.poll(now_ms);
        }
        self.slots.retain(|_, slot| slot.current().is_some());
    }

    pub fn message(&self, id: EntryId) -> Option<&str> {
        self.slots.get(&id).and_then(|slot| slot.current())
    }

    /// Drop slots whose rows are gone from `form`.
    pub fn retain_live(&mut self, form: &ContactForm) {
        self.slots.retain(|id, _| form.entry_by_id(*id).is_some());
    }

    /// Earliest pending deadline, for hosts that schedule a single wake-up.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.slots.values().filter_map(|slot| slot.deadline_ms()).min()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.values().all(|slot| slot.current().is_none())
    }
}
