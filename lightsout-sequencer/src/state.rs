use super::config::{ConfigError, SequencerConfig};
use super::display::DisplaySurface;
use super::session::Session;
use super::trial::Trial;
use lightsout_core::{
    FaultReason, LAMP_COUNT, Outcome, Snapshot, Tier, TrialPhase, TrialRecord, classify,
};
use lightsout_timing::{Clock, TimerQueue};
use rand::Rng;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceEvent {
    LampOn(usize),
    GoDark,
}

/// Timer entry tagged with the trial generation that scheduled it
#[derive(Debug, Clone, Copy)]
struct Scheduled {
    generation: u64,
    event: SequenceEvent,
}

/// What a react signal did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactOutcome {
    /// No trial was running
    Ignored,
    EarlyPress,
    Completed { reaction_time_ms: u64, tier: Tier },
}

/// Drives one trial at a time from `start()` to a terminal outcome.
///
/// Scheduling is cooperative: nothing happens between calls. The host calls
/// [`poll`](Self::poll) from its event loop and [`react`](Self::react) from its
/// input handler; [`next_deadline`](Self::next_deadline) says when the next
/// poll is due.
pub struct ReactionSequencer<C, R>
where
    C: Clock,
    R: Rng,
{
    clock: C,
    rng: R,
    config: SequencerConfig,
    timers: TimerQueue<Scheduled>,
    generation: u64,
    trial: Trial,
    session: Session,
    surfaces: Vec<Box<dyn DisplaySurface>>,
}

impl<C, R> ReactionSequencer<C, R>
where
    C: Clock,
    R: Rng,
{
    pub fn new(config: SequencerConfig, clock: C, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clock,
            rng,
            config,
            timers: TimerQueue::new(),
            generation: 0,
            trial: Trial::idle(),
            session: Session::new(),
            surfaces: Vec::new(),
        })
    }

    /// Registers a surface and renders the current state to it right away
    pub fn attach<S>(&mut self, mut surface: S)
    where
        S: DisplaySurface + 'static,
    {
        surface.render(&self.trial.snapshot());
        self.surfaces.push(Box::new(surface));
    }

    /// Begins a new trial, discarding whatever was running
    pub fn start(&mut self) {
        self.generation += 1;
        let dropped = self.timers.clear();
        if dropped > 0 {
            debug!(
                trial = self.trial.id,
                dropped, "superseding trial, pending timers cancelled"
            );
        }

        let now = self.clock.now_ms();
        self.trial = Trial::begin(self.generation, now);

        for index in 0..LAMP_COUNT {
            let delay = self.config.step_interval_ms.saturating_mul(index as u64 + 1);
            self.timers.schedule(
                now,
                delay,
                Scheduled {
                    generation: self.generation,
                    event: SequenceEvent::LampOn(index),
                },
            );
        }

        info!(trial = self.trial.id, at_ms = now, "trial started");
        self.publish();
    }

    /// Fires every timer that is due. Returns true if the trial changed.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut changed = false;

        while let Some((deadline, scheduled)) = self.timers.pop_due(now) {
            // start() and an early press clear the queue; a missed clear must
            // still never fire into the next trial
            if scheduled.generation != self.generation {
                trace!(
                    stale = scheduled.generation,
                    live = self.generation,
                    "discarding stale timer"
                );
                continue;
            }
            changed |= self.fire(scheduled.event, deadline, now);
        }

        changed
    }

    fn fire(&mut self, event: SequenceEvent, deadline: u64, now: u64) -> bool {
        if !self.trial.phase.is_sequencing() {
            return false;
        }

        match event {
            SequenceEvent::LampOn(index) => {
                self.trial.lamps.light_through(index);
                debug!(
                    trial = self.trial.id,
                    lamp = index,
                    due_ms = deadline,
                    at_ms = now,
                    "lamp on"
                );

                if index + 1 == LAMP_COUNT {
                    let (min, max) = self.config.go_dark_range_ms;
                    let hold = self.rng.random_range(min..max);
                    self.timers.schedule(
                        now,
                        hold,
                        Scheduled {
                            generation: self.generation,
                            event: SequenceEvent::GoDark,
                        },
                    );
                    debug!(trial = self.trial.id, hold_ms = hold, "all lamps lit");
                }
            }
            SequenceEvent::GoDark => {
                self.trial.lamps.extinguish();
                self.trial.phase = TrialPhase::Armed;
                self.trial.timestamps.armed = Some(now);
                info!(
                    trial = self.trial.id,
                    due_ms = deadline,
                    at_ms = now,
                    "lights out"
                );
            }
        }

        self.publish();
        true
    }

    /// Handles the single react input. Only the first react of a trial counts.
    pub fn react(&mut self) -> ReactOutcome {
        let now = self.clock.now_ms();

        match self.trial.phase {
            TrialPhase::Sequencing => {
                let cancelled = self.timers.clear();
                self.trial.phase = TrialPhase::Faulted;
                self.trial.fault = Some(FaultReason::EarlyPress);
                info!(
                    trial = self.trial.id,
                    lit = self.trial.lamps.lit_count(),
                    cancelled,
                    "early press"
                );

                self.finish(Outcome::Faulted {
                    reason: FaultReason::EarlyPress,
                });
                ReactOutcome::EarlyPress
            }
            TrialPhase::Armed => {
                let armed_at = self.trial.timestamps.armed.unwrap_or(now);
                let reaction_time_ms = now.saturating_sub(armed_at);
                let tier = classify(reaction_time_ms);

                self.trial.timestamps.response = Some(now);
                self.trial.phase = TrialPhase::Completed;
                info!(
                    trial = self.trial.id,
                    reaction_time_ms,
                    ?tier,
                    "reaction recorded"
                );

                self.finish(Outcome::Completed {
                    reaction_time_ms,
                    tier,
                });
                ReactOutcome::Completed {
                    reaction_time_ms,
                    tier,
                }
            }
            phase => {
                debug!(trial = self.trial.id, %phase, "react ignored");
                ReactOutcome::Ignored
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.session.record(TrialRecord {
            trial_id: self.trial.id,
            outcome,
        });
        self.publish();
    }

    fn publish(&mut self) {
        let snapshot = self.trial.snapshot();
        for surface in &mut self.surfaces {
            surface.render(&snapshot);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.trial.snapshot()
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }

    pub fn phase(&self) -> TrialPhase {
        self.trial.phase
    }

    /// Earliest pending timer deadline, in clock milliseconds
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
