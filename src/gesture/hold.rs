use crate::gesture::PointerSignal;
use ratatui::layout::{Position, Rect};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(500);

/// Where the controller is in the current press. `Fired` and `Cancelled`
/// are terminal for that press and behave like `Idle` for new input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldPhase {
    Idle,
    Pending,
    Fired,
    Cancelled,
}

/// Delivered to the callback once per qualifying press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldActivation {
    pub target: Rect,
    pub pressed_at: Instant,
    pub held_for: Duration,
}

/// Whether the caller should keep routing a signal to enclosing handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    target: Rect,
    pressed_at: Instant,
    deadline: Instant,
}

/// Press-and-hold recognizer for one on-screen target.
///
/// The timer is a deadline checked by `tick`, so it is single-shot per press
/// and never outlives `detach`. Dropping the controller detaches it.
pub struct HoldGesture<F: FnMut(HoldActivation)> {
    callback: F,
    threshold: Duration,
    target: Option<Rect>,
    phase: HoldPhase,
    timer: Option<ArmedTimer>,
    movement_listeners: bool,
    /// Set after firing so the release that ends the hold is not seen as a click.
    swallow_release: bool,
}

impl<F: FnMut(HoldActivation)> HoldGesture<F> {
    pub fn new(callback: F, threshold: Option<Duration>) -> Self {
        HoldGesture {
            callback,
            threshold: threshold.unwrap_or(DEFAULT_HOLD_THRESHOLD),
            target: None,
            phase: HoldPhase::Idle,
            timer: None,
            movement_listeners: false,
            swallow_release: false,
        }
    }

    pub fn phase(&self) -> HoldPhase {
        self.phase
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    /// Deadline of the live timer, for sizing the event-loop poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|t| t.deadline)
    }

    /// Starts listening for presses on `target`. Calling it again while
    /// attached only moves the target, so a press in flight survives a
    /// re-render.
    pub fn attach(&mut self, target: Rect) {
        if self.target.is_none() {
            trace!(?target, "hold target attached");
        }
        self.target = Some(target);
    }

    /// Releases every listener and clears any live timer.
    pub fn detach(&mut self) {
        if self.target.is_none() && self.timer.is_none() {
            return;
        }
        trace!("hold target detached");
        self.target = None;
        self.timer = None;
        self.movement_listeners = false;
        self.swallow_release = false;
        self.phase = HoldPhase::Idle;
    }

    /// Feeds one pointer signal at `position`.
    pub fn handle(&mut self, signal: PointerSignal, position: Position, now: Instant) -> Propagation {
        let Some(target) = self.target else {
            return Propagation::Continue;
        };

        if signal.is_press_start() {
            if !target.contains(position) {
                return Propagation::Continue;
            }
            // A second press while pending re-arms: last press wins.
            self.timer = Some(ArmedTimer {
                target,
                pressed_at: now,
                deadline: now + self.threshold,
            });
            self.phase = HoldPhase::Pending;
            self.movement_listeners = true;
            self.swallow_release = false;
            return Propagation::Continue;
        }

        if self.movement_listeners {
            debug!(?signal, "hold cancelled before threshold");
            self.timer = None;
            self.movement_listeners = false;
            self.phase = HoldPhase::Cancelled;
            return Propagation::Continue;
        }

        if self.swallow_release && signal.is_release() {
            self.swallow_release = false;
            return Propagation::Stop;
        }

        Propagation::Continue
    }

    /// Fires the callback if the armed timer has elapsed. Returns whether it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(timer) = self.timer else {
            return false;
        };
        if now < timer.deadline {
            return false;
        }

        self.timer = None;
        self.movement_listeners = false;
        self.swallow_release = true;
        self.phase = HoldPhase::Fired;

        let activation = HoldActivation {
            target: timer.target,
            pressed_at: timer.pressed_at,
            held_for: now.saturating_duration_since(timer.pressed_at),
        };
        debug!(held_ms = activation.held_for.as_millis() as u64, "hold fired");
        (self.callback)(activation);
        true
    }
}

impl<F: FnMut(HoldActivation)> Drop for HoldGesture<F> {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const TARGET: Rect = Rect {
        x: 0,
        y: 2,
        width: 40,
        height: 1,
    };
    const INSIDE: Position = Position { x: 5, y: 2 };
    const OUTSIDE: Position = Position { x: 5, y: 7 };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counting() -> (Rc<Cell<u32>>, impl FnMut(HoldActivation)) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move |_| c.set(c.get() + 1))
    }

    fn attached(cb: impl FnMut(HoldActivation)) -> HoldGesture<impl FnMut(HoldActivation)> {
        let mut g = HoldGesture::new(cb, None);
        g.attach(TARGET);
        g
    }

    #[test]
    fn test_release_before_threshold_never_fires() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        assert_eq!(g.phase(), HoldPhase::Pending);
        assert!(!g.tick(t0 + ms(200)));
        assert_eq!(g.handle(PointerSignal::MouseUp, INSIDE, t0 + ms(300)), Propagation::Continue);
        assert_eq!(g.phase(), HoldPhase::Cancelled);
        assert!(!g.tick(t0 + ms(2000)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_hold_past_threshold_fires_exactly_once() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        assert!(!g.tick(t0 + ms(499)));
        assert!(g.tick(t0 + ms(500)));
        assert!(!g.tick(t0 + ms(600)));
        assert!(!g.tick(t0 + ms(5000)));
        assert_eq!(count.get(), 1);
        assert_eq!(g.phase(), HoldPhase::Fired);
    }

    #[test]
    fn test_movement_before_threshold_cancels() {
        for signal in [
            PointerSignal::MouseMove,
            PointerSignal::TouchMove,
            PointerSignal::TouchEnd,
            PointerSignal::TouchCancel,
        ] {
            let (count, cb) = counting();
            let mut g = attached(cb);
            let t0 = Instant::now();
            g.handle(PointerSignal::TouchStart, INSIDE, t0);
            g.handle(signal, INSIDE, t0 + ms(100));
            assert!(!g.tick(t0 + ms(1000)), "{signal:?} should cancel");
            assert_eq!(count.get(), 0);
        }
    }

    #[test]
    fn test_release_after_fire_is_swallowed_once() {
        let (_, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        g.tick(t0 + ms(600));
        assert_eq!(g.handle(PointerSignal::MouseUp, INSIDE, t0 + ms(700)), Propagation::Stop);
        assert_eq!(g.handle(PointerSignal::MouseUp, INSIDE, t0 + ms(800)), Propagation::Continue);
    }

    #[test]
    fn test_movement_after_fire_does_not_swallow_or_refire() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        g.tick(t0 + ms(600));
        assert_eq!(g.handle(PointerSignal::MouseMove, INSIDE, t0 + ms(650)), Propagation::Continue);
        assert_eq!(g.phase(), HoldPhase::Fired);
        assert_eq!(g.handle(PointerSignal::MouseUp, INSIDE, t0 + ms(700)), Propagation::Stop);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_press_outside_target_is_ignored() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, OUTSIDE, t0);
        assert_eq!(g.phase(), HoldPhase::Idle);
        assert!(!g.tick(t0 + ms(1000)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_unattached_controller_ignores_input() {
        let (count, cb) = counting();
        let mut g = HoldGesture::new(cb, None);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        assert!(!g.tick(t0 + ms(1000)));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_detach_clears_live_timer() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        g.detach();
        assert_eq!(g.next_deadline(), None);
        assert!(!g.tick(t0 + ms(1000)));
        assert_eq!(count.get(), 0);

        // Reattaching restores press listening.
        g.attach(TARGET);
        g.handle(PointerSignal::MouseDown, INSIDE, t0 + ms(1000));
        assert!(g.tick(t0 + ms(1500)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_reattach_while_pending_keeps_press() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        g.attach(Rect { y: 3, ..TARGET });
        assert!(g.tick(t0 + ms(500)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_custom_threshold_and_activation_payload() {
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        let mut g = HoldGesture::new(move |a: HoldActivation| s.set(Some(a)), Some(ms(1000)));
        g.attach(TARGET);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        assert_eq!(g.next_deadline(), Some(t0 + ms(1000)));
        assert!(!g.tick(t0 + ms(900)));
        assert!(g.tick(t0 + ms(1200)));
        let a = seen.get().unwrap();
        assert_eq!(a.target, TARGET);
        assert_eq!(a.pressed_at, t0);
        assert_eq!(a.held_for, ms(1200));
    }

    #[test]
    fn test_second_press_rearms_timer() {
        let (count, cb) = counting();
        let mut g = attached(cb);
        let t0 = Instant::now();
        g.handle(PointerSignal::MouseDown, INSIDE, t0);
        g.handle(PointerSignal::TouchStart, INSIDE, t0 + ms(300));
        assert!(!g.tick(t0 + ms(600)));
        assert!(g.tick(t0 + ms(800)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drop_detaches() {
        let (count, cb) = counting();
        {
            let mut g = attached(cb);
            g.handle(PointerSignal::MouseDown, INSIDE, Instant::now());
        }
        assert_eq!(count.get(), 0);
    }
}
