//! Ambient simulation state, passed explicitly
//!
//! Everything that would otherwise be a global — the seeded RNG, the event
//! bus, the message queue, the content tables, the tuning config — lives in
//! one context value owned by the turn loop and threaded into every
//! operation that needs it. Determinism falls out of the single RNG stream.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::core::config::SimulationConfig;
use crate::data::ContentCatalog;
use crate::events::{EventBus, Subscriber};

/// Human-readable strings queued for the terminal adapter
#[derive(Debug, Default)]
pub struct MessageQueue {
    queue: VecDeque<String>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, message: impl Into<String>) {
        self.queue.push_back(message.into());
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// The ambient state of one simulation run
pub struct SimulationContext {
    pub rng: ChaCha8Rng,
    pub events: EventBus,
    pub messages: MessageQueue,
    pub content: ContentCatalog,
    pub config: SimulationConfig,
}

impl SimulationContext {
    pub fn new(seed: u64, content: ContentCatalog) -> Self {
        Self::with_config(seed, content, SimulationConfig::default())
    }

    pub fn with_config(seed: u64, content: ContentCatalog, config: SimulationConfig) -> Self {
        let mut events = EventBus::new();
        events.subscribe(Subscriber::WitnessLift);
        events.subscribe(Subscriber::TownsfolkFlags);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            events,
            messages: MessageQueue::new(),
            content,
            config,
        }
    }
}
