//! Reflow scheduling
//!
//! Decides when a pass runs. The host drives it with its own clock and
//! frame callbacks: `poll` is called from timers, and a started pass is
//! finished from the next animation frame. Nothing here blocks.
//!
//! At most one pass is in flight. Triggers that come due while a pass is
//! waiting for its frame collapse into a single queued rerun, and
//! [`ReflowScheduler::supersede`] invalidates the in-flight pass so its
//! result is discarded when it finishes.

use crate::config::ReflowConfig;

/// What caused a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First pass after mount, once the settle delay has passed
    Mount,
    /// The measurement surface changed size
    ContentResize,
    /// The viewport changed size
    ViewportResize,
}

/// Handle for a started pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    pub generation: u64,
    pub trigger: Trigger,
}

/// Outcome of finishing a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The pass is still current; its result should be published
    Current,
    /// A newer pass or a teardown replaced it; drop the result
    Superseded,
}

/// Timer and in-flight bookkeeping for reflow passes
#[derive(Debug)]
pub struct ReflowScheduler {
    settle_delay_ms: u64,
    debounce_ms: u64,
    mount_deadline: Option<u64>,
    resize_deadline: Option<(u64, Trigger)>,
    in_flight: Option<u64>,
    /// Rerun waiting for the in-flight pass, with the time it came due
    queued: Option<(u64, Trigger)>,
    next_generation: u64,
    observing: bool,
    torn_down: bool,
}

impl ReflowScheduler {
    pub fn new(config: &ReflowConfig) -> Self {
        Self {
            settle_delay_ms: config.settle_delay_ms,
            debounce_ms: config.debounce_ms,
            mount_deadline: None,
            resize_deadline: None,
            in_flight: None,
            queued: None,
            next_generation: 1,
            observing: false,
            torn_down: false,
        }
    }

    /// Start observing and schedule the first pass after the settle delay
    pub fn mount(&mut self, now_ms: u64) {
        if self.torn_down {
            return;
        }
        self.observing = true;
        self.mount_deadline = Some(now_ms.saturating_add(self.settle_delay_ms));
    }

    /// Size-change notification from the measurement surface
    pub fn notify_content_resize(&mut self, now_ms: u64) {
        if self.observing {
            self.debounce(now_ms, Trigger::ContentResize);
        }
    }

    /// Viewport resize notification
    pub fn notify_viewport_resize(&mut self, now_ms: u64) {
        if self.observing {
            self.debounce(now_ms, Trigger::ViewportResize);
        }
    }

    /// Restart the quiet period; bursts collapse into one pass
    fn debounce(&mut self, now_ms: u64, trigger: Trigger) {
        self.resize_deadline = Some((now_ms.saturating_add(self.debounce_ms), trigger));
    }

    /// Take the trigger that is due at `now_ms`, if any
    fn take_due(&mut self, now_ms: u64) -> Option<Trigger> {
        if let Some(deadline) = self.mount_deadline {
            if deadline <= now_ms {
                self.mount_deadline = None;
                return Some(Trigger::Mount);
            }
        }
        if let Some((deadline, trigger)) = self.resize_deadline {
            if deadline <= now_ms {
                self.resize_deadline = None;
                return Some(trigger);
            }
        }
        None
    }

    /// Start a pass if one is due and none is in flight
    pub fn poll(&mut self, now_ms: u64) -> Option<PassTicket> {
        if self.torn_down {
            return None;
        }

        if let Some(trigger) = self.take_due(now_ms) {
            if self.in_flight.is_some() {
                log::debug!("reflow pass in flight, queueing {:?}", trigger);
                self.queued = Some((now_ms, trigger));
                return None;
            }
            return Some(self.start(trigger));
        }

        if self.in_flight.is_none() {
            if let Some((_, trigger)) = self.queued.take() {
                return Some(self.start(trigger));
            }
        }

        None
    }

    fn start(&mut self, trigger: Trigger) -> PassTicket {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.in_flight = Some(generation);
        PassTicket {
            generation,
            trigger,
        }
    }

    /// Mark a started pass as done
    pub fn finish(&mut self, ticket: PassTicket) -> Completion {
        if self.in_flight == Some(ticket.generation) && !self.torn_down {
            self.in_flight = None;
            Completion::Current
        } else {
            log::debug!("dropping superseded reflow pass {}", ticket.generation);
            Completion::Superseded
        }
    }

    /// Invalidate the in-flight pass, e.g. after the content was replaced
    pub fn supersede(&mut self) {
        if self.in_flight.take().is_some() {
            log::debug!("in-flight reflow pass superseded");
        }
    }

    /// Earliest pending timer, for hosts that arm a single timeout.
    ///
    /// A queued rerun is reported once the in-flight pass has finished; its
    /// deadline is already past, so the host should poll right away.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.torn_down {
            return None;
        }
        let queued = match (self.in_flight, self.queued) {
            (None, Some((due, _))) => Some(due),
            _ => None,
        };
        [
            self.mount_deadline,
            self.resize_deadline.map(|(deadline, _)| deadline),
            queued,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn has_pass_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn has_queued_pass(&self) -> bool {
        self.queued.is_some()
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release all timers and observation; later triggers are ignored
    pub fn teardown(&mut self) {
        self.mount_deadline = None;
        self.resize_deadline = None;
        self.queued = None;
        self.in_flight = None;
        self.observing = false;
        self.torn_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> ReflowScheduler {
        ReflowScheduler::new(&ReflowConfig {
            settle_delay_ms: 100,
            debounce_ms: 150,
            ..ReflowConfig::default()
        })
    }

    #[test]
    fn test_mount_waits_for_settle_delay() {
        let mut s = scheduler();
        s.mount(1_000);
        assert_eq!(s.next_deadline(), Some(1_100));
        assert_eq!(s.poll(1_050), None);

        let ticket = s.poll(1_100).unwrap();
        assert_eq!(ticket.trigger, Trigger::Mount);
        assert!(s.has_pass_in_flight());
        assert_eq!(s.finish(ticket), Completion::Current);
        assert!(!s.has_pass_in_flight());
    }

    #[test]
    fn test_resize_burst_coalesces() {
        let mut s = scheduler();
        s.mount(0);
        let ticket = s.poll(100).unwrap();
        s.finish(ticket);

        for t in [200, 250, 300, 340] {
            s.notify_viewport_resize(t);
        }
        s.notify_content_resize(360);
        assert_eq!(s.poll(400), None);
        assert_eq!(s.poll(509), None);

        let ticket = s.poll(510).unwrap();
        assert_eq!(ticket.trigger, Trigger::ContentResize);
        s.finish(ticket);
        assert_eq!(s.poll(10_000), None);
    }

    #[test]
    fn test_notifications_before_mount_are_ignored() {
        let mut s = scheduler();
        s.notify_content_resize(0);
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.poll(1_000), None);
    }

    #[test]
    fn test_one_pass_in_flight_with_queue_of_one() {
        let mut s = scheduler();
        s.mount(0);
        let first = s.poll(100).unwrap();

        // Two triggers come due while the first pass waits for its frame
        s.notify_viewport_resize(110);
        assert_eq!(s.poll(260), None);
        s.notify_content_resize(270);
        assert_eq!(s.poll(420), None);
        assert!(s.has_queued_pass());

        assert_eq!(s.finish(first), Completion::Current);
        let second = s.poll(421).unwrap();
        assert_eq!(second.trigger, Trigger::ContentResize);
        assert_ne!(second.generation, first.generation);
        s.finish(second);
        assert_eq!(s.poll(1_000), None);
    }

    #[test]
    fn test_queued_rerun_reports_deadline() {
        let mut s = scheduler();
        s.mount(0);
        let first = s.poll(100).unwrap();

        s.notify_viewport_resize(110);
        assert_eq!(s.poll(260), None);
        // Still waiting on the in-flight pass
        assert_eq!(s.next_deadline(), None);

        s.finish(first);
        assert_eq!(s.next_deadline(), Some(260));
        let rerun = s.poll(261).unwrap();
        assert_eq!(rerun.trigger, Trigger::ViewportResize);
        s.finish(rerun);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_superseded_pass_is_dropped() {
        let mut s = scheduler();
        s.mount(0);
        let stale = s.poll(100).unwrap();

        s.supersede();
        s.notify_content_resize(120);
        let fresh = s.poll(270).unwrap();

        assert_eq!(s.finish(stale), Completion::Superseded);
        assert!(s.has_pass_in_flight());
        assert_eq!(s.finish(fresh), Completion::Current);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut s = scheduler();
        s.mount(0);
        let in_flight = s.poll(100).unwrap();
        s.notify_viewport_resize(120);

        s.teardown();
        assert!(s.is_torn_down());
        assert!(!s.is_observing());
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.finish(in_flight), Completion::Superseded);

        s.mount(500);
        s.notify_content_resize(500);
        assert_eq!(s.poll(10_000), None);
    }
}
