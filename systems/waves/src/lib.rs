#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler that paces enemy spawns across waves.
//!
//! The scheduler is a three-state machine. While [`Phase::Idle`] it counts
//! down the inter-wave cooldown, while [`Phase::Spawning`] it releases one
//! enemy per spawn interval from the current wave's queue, and once every wave
//! has been cleared it parks in the terminal [`Phase::AllComplete`]. A wave
//! only counts as cleared when its queue is empty and the caller reports no
//! live enemies, so consecutive waves never overlap.

use std::{collections::VecDeque, time::Duration};

use log::debug;
use path_defence_core::{EnemyKind, Event, WaveProgress, WaveStage};
use serde::{Deserialize, Serialize};

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    first_wave_delay: Duration,
    wave_interval: Duration,
    spawn_interval: Duration,
}

impl Config {
    /// Creates a new configuration from the session's timing parameters.
    #[must_use]
    pub const fn new(
        first_wave_delay: Duration,
        wave_interval: Duration,
        spawn_interval: Duration,
    ) -> Self {
        Self {
            first_wave_delay,
            wave_interval,
            spawn_interval,
        }
    }
}

/// State of the scheduler's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the cooldown to elapse before starting the next wave.
    Idle {
        /// Time left before the next wave starts.
        cooldown: Duration,
    },
    /// Releasing enemies from the current wave.
    Spawning {
        /// Time accumulated since the previous spawn.
        spawn_timer: Duration,
    },
    /// Every wave was cleared. Terminal.
    AllComplete,
}

/// Pure system that turns elapsed time into enemy spawn requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveScheduler {
    waves: Vec<VecDeque<EnemyKind>>,
    wave_index: usize,
    phase: Phase,
    wave_interval: Duration,
    spawn_interval: Duration,
}

impl WaveScheduler {
    /// Creates a scheduler idling for the first-wave delay.
    #[must_use]
    pub fn new(config: Config, waves: Vec<Vec<EnemyKind>>) -> Self {
        Self {
            waves: waves.into_iter().map(VecDeque::from).collect(),
            wave_index: 0,
            phase: Phase::Idle {
                cooldown: config.first_wave_delay,
            },
            wave_interval: config.wave_interval,
            spawn_interval: config.spawn_interval,
        }
    }

    /// Advances the scheduler by `dt`.
    ///
    /// `live_enemies` is the number of enemies currently alive in the world.
    /// Archetypes to spawn at the path start are appended to `spawns` in
    /// order; wave transitions are reported through `out_events`. Time left
    /// over after an elapsed cooldown feeds the new wave's spawn timer.
    pub fn handle(
        &mut self,
        mut dt: Duration,
        live_enemies: usize,
        spawns: &mut Vec<EnemyKind>,
        out_events: &mut Vec<Event>,
    ) {
        if let Phase::Idle { cooldown } = self.phase {
            if self.wave_index >= self.waves.len() {
                debug!("all {} waves cleared", self.waves.len());
                self.phase = Phase::AllComplete;
                out_events.push(Event::AllWavesCleared);
                return;
            }

            if dt < cooldown {
                self.phase = Phase::Idle {
                    cooldown: cooldown - dt,
                };
                return;
            }

            dt -= cooldown;
            let wave = self.wave_number();
            debug!("wave {wave} started");
            self.phase = Phase::Spawning {
                spawn_timer: Duration::ZERO,
            };
            out_events.push(Event::WaveStarted { wave });
        }

        let Phase::Spawning { spawn_timer } = self.phase else {
            return;
        };

        let Some(queue) = self.waves.get_mut(self.wave_index) else {
            self.phase = Phase::AllComplete;
            return;
        };

        let mut spawn_timer = spawn_timer.saturating_add(dt);
        let mut spawned = 0;
        if spawn_timer >= self.spawn_interval {
            if let Some(kind) = queue.pop_front() {
                spawns.push(kind);
                spawned += 1;
                spawn_timer = Duration::ZERO;
            }
        }

        if queue.is_empty() && live_enemies + spawned == 0 {
            let wave = self.wave_number();
            debug!("wave {wave} cleared");
            out_events.push(Event::WaveCleared { wave });
            self.wave_index += 1;
            self.phase = Phase::Idle {
                cooldown: self.wave_interval,
            };
        } else {
            self.phase = Phase::Spawning { spawn_timer };
        }
    }

    /// Current state of the state machine.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Reports whether the terminal [`Phase::AllComplete`] was reached.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::AllComplete)
    }

    /// Summarises the scheduler for display.
    #[must_use]
    pub fn progress(&self) -> WaveProgress {
        let (stage, cooldown_remaining) = match self.phase {
            Phase::Idle { cooldown } => (WaveStage::Idle, cooldown),
            Phase::Spawning { .. } => (WaveStage::Spawning, Duration::ZERO),
            Phase::AllComplete => (WaveStage::AllComplete, Duration::ZERO),
        };
        let total_waves = to_u32(self.waves.len());
        let remaining = self
            .waves
            .get(self.wave_index)
            .map_or(0, VecDeque::len);

        WaveProgress {
            wave: self.wave_number().min(total_waves),
            total_waves,
            stage,
            remaining_in_wave: to_u32(remaining),
            cooldown_remaining,
        }
    }

    fn wave_number(&self) -> u32 {
        to_u32(self.wave_index.saturating_add(1))
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
