//! Cooperative timed pauses
//!
//! Round flow never blocks: each "wait N ms, then continue" is a `Step`
//! scheduled on the timeline together with the game generation it belongs to.
//! `Game::advance` pops due steps in order and drops any whose generation has
//! moved on, which is how a reset or a new playback cancels stale timers.

use super::difficulty::Timings;

/// A deferred continuation of the round flow
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Reveal `sequence[index]`, then schedule the next reveal
    Reveal { index: usize, timings: Timings },
    /// Playback finished, start accepting taps
    EnterInput,
    /// Extra burst of the small win celebration
    SmallBurst,
    /// Win settle delay elapsed
    WinSettled,
    /// Endless milestone choreography finished
    MilestoneDone,
    /// Pause after appending a target elapsed, play the sequence
    PlayNextRound,
    /// Lose settle delay elapsed, retry the same sequence
    LoseSettled,
    /// Finale choreography finished, show the victory screen
    VictoryShown,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: f64,
    order: u64,
    generation: u64,
    step: Step,
}

/// Virtual clock plus pending continuations
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    now_ms: f64,
    /// Time new steps are scheduled from (the due time of the running step)
    cursor_ms: f64,
    next_order: u64,
    pending: Vec<Scheduled>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (ms since the game was created)
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `step` to run `delay_ms` after the current step
    pub fn schedule(&mut self, delay_ms: u32, generation: u64, step: Step) {
        let order = self.next_order;
        self.next_order += 1;
        self.pending.push(Scheduled {
            due_ms: self.cursor_ms + delay_ms as f64,
            order,
            generation,
            step,
        });
    }

    /// Move the clock forward
    pub fn advance_clock(&mut self, dt_ms: f64) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    /// Earliest step that is due, with the generation it was scheduled under.
    /// Ties run in scheduling order.
    pub fn pop_due(&mut self) -> Option<(u64, Step)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= self.now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.order.cmp(&b.order))
            })
            .map(|(i, _)| i);

        match idx {
            Some(i) => {
                let s = self.pending.remove(i);
                self.cursor_ms = s.due_ms;
                Some((s.generation, s.step))
            }
            None => {
                self.cursor_ms = self.now_ms;
                None
            }
        }
    }

    /// When the next step becomes due
    pub fn next_due_ms(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|s| s.due_ms)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
