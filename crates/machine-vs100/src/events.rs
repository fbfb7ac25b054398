//! Timed device events.
//!
//! The step loop advances the queue by each instruction's cycle count and
//! then fires everything that has come due, earliest first. Handlers may
//! schedule further events; those are measured from the current time.

use emu_core::Ticks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Run the programmed BBA operation.
    BbaGo,
    VerticalSync,
    /// Deliver the next LK201 byte to the keyboard UART.
    KeyboardByte,
}

#[derive(Debug, Default)]
pub struct EventQueue {
    now: Ticks,
    /// Due time and event, in scheduling order.
    pending: Vec<(Ticks, Event)>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn schedule(&mut self, delay: Ticks, event: Event) {
        self.pending.push((self.now + delay, event));
    }

    #[must_use]
    pub fn is_scheduled(&self, event: Event) -> bool {
        self.pending.iter().any(|&(_, e)| e == event)
    }

    pub fn advance(&mut self, elapsed: Ticks) {
        self.now += elapsed;
    }

    /// Remove and return the earliest due event. Ties fire in the order
    /// they were scheduled.
    pub fn pop_due(&mut self) -> Option<Event> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= self.now)
            .min_by_key(|(_, (due, _))| *due)?;
        Some(self.pending.remove(index).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_fire_once_due_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(Ticks::new(100), Event::VerticalSync);
        queue.schedule(Ticks::new(50), Event::BbaGo);
        queue.schedule(Ticks::new(50), Event::KeyboardByte);

        queue.advance(Ticks::new(49));
        assert_eq!(queue.pop_due(), None);

        queue.advance(Ticks::new(60));
        assert_eq!(queue.pop_due(), Some(Event::BbaGo));
        assert_eq!(queue.pop_due(), Some(Event::KeyboardByte));
        assert_eq!(queue.pop_due(), Some(Event::VerticalSync));
        assert_eq!(queue.pop_due(), None);
    }

    #[test]
    fn rescheduling_counts_from_now() {
        let mut queue = EventQueue::new();
        queue.advance(Ticks::new(1000));
        queue.schedule(Ticks::new(10), Event::VerticalSync);
        assert!(queue.is_scheduled(Event::VerticalSync));
        queue.advance(Ticks::new(9));
        assert_eq!(queue.pop_due(), None);
        queue.advance(Ticks::new(1));
        assert_eq!(queue.pop_due(), Some(Event::VerticalSync));
        assert!(!queue.is_scheduled(Event::VerticalSync));
    }
}
