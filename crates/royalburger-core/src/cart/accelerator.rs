//! Quantity-adjustment accelerator for cart lines.
//!
//! Holding or rapidly tapping the +/- buttons of a cart line should not
//! fire one API write per tap. Presses accumulate into one pending write
//! per line, the step grows while the presses keep coming, and the write
//! becomes due once the line has been left alone for `flush_delay`.
//!
//! Time is always passed in by the caller, which also owns the timer that
//! calls [`QuantityAccelerator::take_due`] at [`QuantityAccelerator::next_deadline`].

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Tuning for [`QuantityAccelerator`]
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorConfig {
    /// Presses closer together than this form one streak.
    pub press_window: Duration,
    /// Streak length after which `accelerated_step` applies.
    pub accelerate_after: u32,
    /// Streak length after which `fast_step` applies.
    pub fast_after: u32,
    /// Step for the first presses of a streak.
    pub step: u32,
    /// Step once the streak passed `accelerate_after`.
    pub accelerated_step: u32,
    /// Step once the streak passed `fast_after`.
    pub fast_step: u32,
    /// Idle time after the last press before the write is due.
    pub flush_delay: Duration,
    /// Lowest quantity a line can be adjusted to.
    pub min_quantity: u32,
    /// Highest quantity a line can be adjusted to.
    pub max_quantity: u32,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            press_window: Duration::from_millis(400),
            accelerate_after: 3,
            fast_after: 8,
            step: 1,
            accelerated_step: 2,
            fast_step: 5,
            flush_delay: Duration::from_millis(600),
            min_quantity: 1,
            max_quantity: 99,
        }
    }
}

impl AcceleratorConfig {
    fn step_for(&self, streak: u32) -> u32 {
        if streak > self.fast_after {
            self.fast_step
        } else if streak > self.accelerate_after {
            self.accelerated_step
        } else {
            self.step
        }
    }

    /// Bound a quantity to `min_quantity..=max_quantity`, whichever way round they are
    fn clamp(&self, quantity: i64) -> u32 {
        let low = self.min_quantity.min(self.max_quantity);
        let high = self.min_quantity.max(self.max_quantity);
        quantity.max(i64::from(low)).min(i64::from(high)) as u32
    }
}

/// Which button was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The "+" button
    Increase,
    /// The "-" button
    Decrease,
}

/// A batched quantity write ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityUpdate {
    /// Cart line id
    pub item_id: String,
    /// Quantity before the batch
    pub previous: u32,
    /// Quantity after the batch
    pub target: u32,
}

impl QuantityUpdate {
    /// Signed change carried by this write
    pub fn delta(&self) -> i64 {
        i64::from(self.target) - i64::from(self.previous)
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    base: u32,
    target: u32,
    streak: u32,
    direction: Direction,
    last_press: Instant,
}

/// Accumulates quantity presses into batched pending writes
#[derive(Debug, Clone, Default)]
pub struct QuantityAccelerator {
    config: AcceleratorConfig,
    pending: HashMap<String, PendingWrite>,
}

impl QuantityAccelerator {
    /// Create an accelerator with the given tuning
    ///
    /// Inverted quantity bounds are swapped rather than rejected.
    pub fn new(mut config: AcceleratorConfig) -> Self {
        if config.min_quantity > config.max_quantity {
            warn!(
                "Quantity bounds are inverted (min {} > max {}), swapping them",
                config.min_quantity, config.max_quantity
            );
            std::mem::swap(&mut config.min_quantity, &mut config.max_quantity);
        }
        Self {
            config,
            pending: HashMap::new(),
        }
    }

    /// Get the current configuration
    pub fn config(&self) -> &AcceleratorConfig {
        &self.config
    }

    /// Register one press on a line
    ///
    /// `current` is the quantity the cart shows when no write is pending
    /// for the line yet; while one is pending, its target is authoritative.
    /// Returns the quantity to display after the press.
    pub fn press(&mut self, item_id: &str, current: u32, direction: Direction, now: Instant) -> u32 {
        let config = &self.config;
        let entry = self
            .pending
            .entry(item_id.to_string())
            .or_insert_with(|| PendingWrite {
                base: current,
                target: config.clamp(i64::from(current)),
                streak: 0,
                direction,
                last_press: now,
            });

        let continues = entry.direction == direction
            && entry.streak > 0
            && now.saturating_duration_since(entry.last_press) <= config.press_window;
        entry.streak = if continues { entry.streak + 1 } else { 1 };
        entry.direction = direction;
        entry.last_press = now;

        let step = i64::from(config.step_for(entry.streak));
        let next = match direction {
            Direction::Increase => i64::from(entry.target) + step,
            Direction::Decrease => i64::from(entry.target) - step,
        };
        entry.target = config.clamp(next);

        debug!(
            "Quantity press on {}: streak {}, step {}, target {}",
            item_id, entry.streak, step, entry.target
        );
        entry.target
    }

    /// Quantity a line will be written with, if a write is pending
    pub fn pending_target(&self, item_id: &str) -> Option<u32> {
        self.pending.get(item_id).map(|p| p.target)
    }

    /// Number of lines with a pending write
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether any write is pending
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Earliest instant at which a pending write becomes due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
            .values()
            .map(|p| p.last_press + self.config.flush_delay)
            .min()
    }

    /// Drain writes whose line has been idle for `flush_delay`
    ///
    /// Writes that ended where they started are dropped instead of
    /// returned. The result is ordered by item id.
    pub fn take_due(&mut self, now: Instant) -> Vec<QuantityUpdate> {
        let delay = self.config.flush_delay;
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| now.saturating_duration_since(p.last_press) >= delay)
            .map(|(id, _)| id.clone())
            .collect();

        let mut updates: Vec<QuantityUpdate> = due
            .into_iter()
            .filter_map(|id| {
                let pending = self.pending.remove(&id)?;
                into_update(id, pending)
            })
            .collect();
        updates.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        updates
    }

    /// Drain every pending write regardless of timing
    pub fn flush_all(&mut self) -> Vec<QuantityUpdate> {
        let mut updates: Vec<QuantityUpdate> = self
            .pending
            .drain()
            .filter_map(|(id, pending)| into_update(id, pending))
            .collect();
        updates.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        updates
    }

    /// Drop the pending write of one line (e.g. the line was removed)
    pub fn discard(&mut self, item_id: &str) -> bool {
        self.pending.remove(item_id).is_some()
    }
}

fn into_update(item_id: String, pending: PendingWrite) -> Option<QuantityUpdate> {
    (pending.target != pending.base).then(|| QuantityUpdate {
        item_id,
        previous: pending.base,
        target: pending.target,
    })
}
