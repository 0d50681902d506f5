//! Global Scatter/Chase timeline with a timed Frightened override.
//!
//! While the override is active the reported mode is always `Frightened`
//! and the phase timer is frozen, so the schedule resumes exactly where it
//! paused once the override runs out.

use crate::config::PhaseConfig;
use crate::types::{GhostMode, ModeChange};

/// Receives `(from, to)` notifications synchronously, inside the call that
/// caused the change.
pub trait ModeListener {
    fn on_mode_changed(&mut self, change: ModeChange);
}

impl ModeListener for Vec<ModeChange> {
    fn on_mode_changed(&mut self, change: ModeChange) {
        self.push(change);
    }
}

pub struct NoListener;

impl ModeListener for NoListener {
    fn on_mode_changed(&mut self, _change: ModeChange) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    pub mode: GhostMode,
    pub duration: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseSchedule {
    phases: Vec<Phase>,
}

impl PhaseSchedule {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn from_config(phases: &[PhaseConfig]) -> Self {
        Self::new(
            phases
                .iter()
                .map(|phase| Phase {
                    mode: phase.mode,
                    duration: phase.duration,
                })
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FrightenedOverride {
    remaining: f32,
    restore: GhostMode,
}

pub struct ModeController {
    schedule: PhaseSchedule,
    current: GhostMode,
    phase_index: usize,
    phase_timer: f32,
    frightened: Option<FrightenedOverride>,
    observers: Vec<(ObserverId, Box<dyn ModeListener>)>,
    next_observer_id: u64,
}

impl ModeController {
    pub fn new(schedule: PhaseSchedule) -> Self {
        let current = schedule
            .get(0)
            .map(|phase| phase.mode)
            .unwrap_or(GhostMode::Chase);
        Self {
            schedule,
            current,
            phase_index: 0,
            phase_timer: 0.0,
            frightened: None,
            observers: Vec::new(),
            next_observer_id: 1,
        }
    }

    pub fn current_mode(&self) -> GhostMode {
        self.current
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened.is_some()
    }

    pub fn frightened_remaining(&self) -> Option<f32> {
        self.frightened.map(|state| state.remaining)
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn phase_elapsed(&self) -> f32 {
        self.phase_timer
    }

    pub fn schedule_exhausted(&self) -> bool {
        self.phase_index >= self.schedule.len()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ModeListener>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id = self.next_observer_id.saturating_add(1);
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Advances the override countdown or, when no override is active, the
    /// phase timer. `listener` hears any change before the subscribers do.
    pub fn tick(&mut self, dt: f32, listener: &mut dyn ModeListener) {
        if let Some(mut state) = self.frightened {
            state.remaining -= dt;
            if state.remaining <= 0.0 {
                self.frightened = None;
                self.set_mode(state.restore, listener);
            } else {
                self.frightened = Some(state);
            }
            return;
        }

        if self.schedule.is_empty() {
            return;
        }

        let Some(phase) = self.schedule.get(self.phase_index).copied() else {
            self.set_mode(GhostMode::Chase, listener);
            return;
        };

        self.phase_timer += dt;
        if self.phase_timer >= phase.duration {
            self.phase_timer = 0.0;
            self.phase_index += 1;
            let next = self
                .schedule
                .get(self.phase_index)
                .map(|phase| phase.mode)
                .unwrap_or(GhostMode::Chase);
            self.set_mode(next, listener);
        }
    }

    /// Re-triggering while already frightened only resets the countdown; the
    /// mode to restore stays the one recorded by the first trigger.
    pub fn trigger_frightened(&mut self, duration: f32, listener: &mut dyn ModeListener) {
        let restore = match self.frightened {
            Some(state) => state.restore,
            None => self.current,
        };
        self.frightened = Some(FrightenedOverride {
            remaining: duration,
            restore,
        });
        tracing::debug!(duration, ?restore, "frightened override armed");
        self.set_mode(GhostMode::Frightened, listener);
    }

    fn set_mode(&mut self, mode: GhostMode, listener: &mut dyn ModeListener) {
        if self.current == mode {
            return;
        }
        let change = ModeChange {
            from: self.current,
            to: mode,
        };
        self.current = mode;
        tracing::debug!(from = ?change.from, to = ?change.to, "ghost mode changed");
        listener.on_mode_changed(change);
        for (_, observer) in &mut self.observers {
            observer.on_mode_changed(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn schedule(entries: &[(GhostMode, f32)]) -> PhaseSchedule {
        PhaseSchedule::new(
            entries
                .iter()
                .map(|&(mode, duration)| Phase { mode, duration })
                .collect(),
        )
    }

    fn run(controller: &mut ModeController, seconds: f32, dt: f32, log: &mut Vec<ModeChange>) {
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            controller.tick(dt, &mut *log);
        }
    }

    struct SharedLog(Rc<RefCell<Vec<ModeChange>>>);

    impl ModeListener for SharedLog {
        fn on_mode_changed(&mut self, change: ModeChange) {
            self.0.borrow_mut().push(change);
        }
    }

    #[test]
    fn empty_schedule_starts_and_stays_in_chase() {
        let mut controller = ModeController::new(PhaseSchedule::default());
        let mut log = Vec::new();
        assert_eq!(controller.current_mode(), GhostMode::Chase);
        run(&mut controller, 10.0, 0.5, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Chase);
        assert!(log.is_empty());
    }

    #[test]
    fn phases_advance_in_order_then_hold_chase() {
        let mut controller = ModeController::new(schedule(&[
            (GhostMode::Scatter, 1.0),
            (GhostMode::Chase, 2.0),
            (GhostMode::Scatter, 1.0),
        ]));
        let mut log = Vec::new();
        assert_eq!(controller.current_mode(), GhostMode::Scatter);

        run(&mut controller, 1.0, 0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Chase);
        run(&mut controller, 2.0, 0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Scatter);
        run(&mut controller, 1.0, 0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Chase);
        assert!(controller.schedule_exhausted());

        run(&mut controller, 500.0, 0.5, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Chase);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn frightened_pauses_phase_timer_losslessly() {
        let mut controller =
            ModeController::new(schedule(&[(GhostMode::Scatter, 4.0), (GhostMode::Chase, 4.0)]));
        let mut log = Vec::new();
        run(&mut controller, 1.5, 0.25, &mut log);
        let before = controller.phase_elapsed();
        let index_before = controller.phase_index();

        controller.trigger_frightened(3.0, &mut log);
        run(&mut controller, 2.75, 0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Frightened);
        assert_eq!(controller.phase_elapsed(), before);

        controller.tick(0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Scatter);
        assert_eq!(controller.phase_elapsed(), before);
        assert_eq!(controller.phase_index(), index_before);

        run(&mut controller, 2.5, 0.25, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Chase);
    }

    #[test]
    fn expiry_restores_the_interrupted_mode() {
        for (start, schedule_entries) in [
            (GhostMode::Scatter, vec![(GhostMode::Scatter, 10.0)]),
            (GhostMode::Chase, vec![(GhostMode::Chase, 10.0)]),
        ] {
            let mut controller = ModeController::new(schedule(&schedule_entries));
            let mut log = Vec::new();
            controller.trigger_frightened(1.0, &mut log);
            run(&mut controller, 1.0, 0.5, &mut log);
            assert_eq!(controller.current_mode(), start);
            assert_eq!(
                log,
                vec![
                    ModeChange {
                        from: start,
                        to: GhostMode::Frightened
                    },
                    ModeChange {
                        from: GhostMode::Frightened,
                        to: start
                    },
                ]
            );
        }
    }

    #[test]
    fn retrigger_resets_timer_and_keeps_first_restore_mode() {
        let mut controller =
            ModeController::new(schedule(&[(GhostMode::Scatter, 10.0), (GhostMode::Chase, 10.0)]));
        let mut log = Vec::new();
        controller.trigger_frightened(2.0, &mut log);
        run(&mut controller, 1.5, 0.5, &mut log);
        controller.trigger_frightened(2.0, &mut log);
        assert_eq!(controller.frightened_remaining(), Some(2.0));
        assert_eq!(log.len(), 1);

        run(&mut controller, 1.5, 0.5, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Frightened);
        run(&mut controller, 0.5, 0.5, &mut log);
        assert_eq!(controller.current_mode(), GhostMode::Scatter);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn subscribers_hear_changes_after_the_call_site_listener() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        let mut controller = ModeController::new(schedule(&[
            (GhostMode::Scatter, 1.0),
            (GhostMode::Chase, 1.0),
            (GhostMode::Scatter, 1.0),
        ]));
        let id = controller.subscribe(Box::new(SharedLog(Rc::clone(&shared))));

        let mut local = Vec::new();
        controller.tick(1.0, &mut local);
        assert_eq!(local.len(), 1);
        assert_eq!(shared.borrow().len(), 1);
        assert_eq!(shared.borrow()[0].to, GhostMode::Chase);

        assert!(controller.unsubscribe(id));
        assert!(!controller.unsubscribe(id));
        controller.tick(1.0, &mut NoListener);
        assert_eq!(controller.current_mode(), GhostMode::Scatter);
        assert_eq!(shared.borrow().len(), 1);
    }

    #[test]
    fn terminal_chase_does_not_rebroadcast() {
        let mut controller = ModeController::new(schedule(&[(GhostMode::Chase, 0.5)]));
        let mut log = Vec::new();
        run(&mut controller, 20.0, 0.5, &mut log);
        assert!(log.is_empty());
        assert_eq!(controller.current_mode(), GhostMode::Chase);
    }
}
