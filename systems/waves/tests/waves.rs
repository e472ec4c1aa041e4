use std::time::Duration;

use path_defence_core::{EnemyKind, Event, WaveStage};
use path_defence_system_waves::{Config, Phase, WaveScheduler};

fn immediate_config() -> Config {
    Config::new(
        Duration::ZERO,
        Duration::from_secs(5),
        Duration::from_secs(1),
    )
}

/// Drives the scheduler while tracking the enemies it released as alive.
struct Harness {
    scheduler: WaveScheduler,
    live: usize,
    spawned: Vec<EnemyKind>,
    events: Vec<Event>,
}

impl Harness {
    fn new(config: Config, waves: Vec<Vec<EnemyKind>>) -> Self {
        Self {
            scheduler: WaveScheduler::new(config, waves),
            live: 0,
            spawned: Vec::new(),
            events: Vec::new(),
        }
    }

    fn tick(&mut self, dt: Duration) {
        let mut spawns = Vec::new();
        self.scheduler
            .handle(dt, self.live, &mut spawns, &mut self.events);
        self.live += spawns.len();
        self.spawned.extend(spawns);
    }
}

#[test]
fn two_enemy_wave_spawns_once_per_second() {
    let mut harness = Harness::new(
        immediate_config(),
        vec![vec![EnemyKind::Basic, EnemyKind::Basic]],
    );
    let half_second = Duration::from_millis(500);

    assert!(harness.spawned.is_empty(), "nothing exists at t=0");

    harness.tick(half_second);
    assert!(harness.spawned.is_empty(), "nothing spawns before t=1.0");

    harness.tick(half_second);
    assert_eq!(harness.spawned.len(), 1, "one enemy at t=1.0");

    harness.tick(half_second);
    assert_eq!(harness.spawned.len(), 1, "still one enemy at t=1.5");

    harness.tick(half_second);
    assert_eq!(harness.spawned.len(), 2, "two enemies at t=2.0");

    let progress = harness.scheduler.progress();
    assert_eq!(progress.remaining_in_wave, 0, "spawn queue drained");
    assert_eq!(progress.stage, WaveStage::Spawning);
}

#[test]
fn wave_waits_for_live_enemies_before_cooldown() {
    let mut harness = Harness::new(
        immediate_config(),
        vec![vec![EnemyKind::Fast], vec![EnemyKind::Tank]],
    );

    harness.tick(Duration::from_secs(1));
    assert_eq!(harness.spawned, vec![EnemyKind::Fast]);

    for _ in 0..20 {
        harness.tick(Duration::from_secs(1));
    }
    assert!(
        matches!(harness.scheduler.phase(), Phase::Spawning { .. }),
        "a live enemy keeps the wave open"
    );
    assert_eq!(harness.spawned.len(), 1, "next wave must not overlap");

    harness.live = 0;
    harness.tick(Duration::from_millis(100));
    assert_eq!(
        harness.scheduler.phase(),
        Phase::Idle {
            cooldown: Duration::from_secs(5)
        }
    );
    assert!(harness.events.contains(&Event::WaveCleared { wave: 1 }));

    harness.tick(Duration::from_millis(4_900));
    assert_eq!(
        harness.scheduler.phase(),
        Phase::Idle {
            cooldown: Duration::from_millis(100)
        },
        "cooldown counts down the full wave interval"
    );

    harness.tick(Duration::from_millis(100));
    assert!(harness.events.contains(&Event::WaveStarted { wave: 2 }));
    assert_eq!(harness.spawned.len(), 1, "spawn timer restarts at zero");

    harness.tick(Duration::from_secs(1));
    assert_eq!(harness.spawned, vec![EnemyKind::Fast, EnemyKind::Tank]);
}

#[test]
fn first_wave_delay_holds_back_spawns() {
    let mut harness = Harness::new(
        Config::new(
            Duration::from_secs(3),
            Duration::from_secs(5),
            Duration::from_secs(1),
        ),
        vec![vec![EnemyKind::Basic]],
    );

    harness.tick(Duration::from_secs(2));
    let progress = harness.scheduler.progress();
    assert_eq!(progress.stage, WaveStage::Idle);
    assert_eq!(progress.wave, 1);
    assert_eq!(progress.total_waves, 1);
    assert_eq!(progress.remaining_in_wave, 1);
    assert_eq!(progress.cooldown_remaining, Duration::from_secs(1));

    harness.tick(Duration::from_secs(1));
    assert!(harness.events.contains(&Event::WaveStarted { wave: 1 }));
    assert!(harness.spawned.is_empty());

    harness.tick(Duration::from_secs(1));
    assert_eq!(harness.spawned, vec![EnemyKind::Basic]);
}

#[test]
fn all_complete_is_terminal() {
    let mut harness = Harness::new(immediate_config(), vec![vec![EnemyKind::Basic]]);

    harness.tick(Duration::from_secs(1));
    harness.live = 0;
    harness.tick(Duration::from_secs(1));
    assert!(harness.events.contains(&Event::WaveCleared { wave: 1 }));
    assert!(!harness.scheduler.is_complete());

    harness.tick(Duration::from_millis(10));
    assert!(harness.scheduler.is_complete());
    assert_eq!(harness.scheduler.progress().stage, WaveStage::AllComplete);
    assert_eq!(harness.scheduler.progress().wave, 1);

    let events_before = harness.events.len();
    for _ in 0..10 {
        harness.tick(Duration::from_secs(5));
    }
    assert_eq!(harness.spawned.len(), 1, "no spawns after completion");
    assert_eq!(harness.events.len(), events_before, "completion is silent");
}

#[test]
fn spawn_order_within_a_wave_is_fifo() {
    let wave = vec![
        EnemyKind::Tank,
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Basic,
    ];
    let mut harness = Harness::new(immediate_config(), vec![wave.clone()]);

    for _ in 0..wave.len() {
        harness.tick(Duration::from_secs(1));
    }

    assert_eq!(harness.spawned, wave);
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let script = [250_u64, 750, 1_000, 16, 2_000, 333, 5_000, 1_000, 1_000, 6_000];
    let waves = vec![
        vec![EnemyKind::Basic, EnemyKind::Fast],
        vec![EnemyKind::Tank],
    ];

    let run = || {
        let mut harness = Harness::new(immediate_config(), waves.clone());
        for (index, millis) in script.iter().enumerate() {
            if index % 3 == 2 {
                harness.live = 0;
            }
            harness.tick(Duration::from_millis(*millis));
        }
        (harness.spawned, harness.events, harness.scheduler)
    };

    assert_eq!(run(), run(), "replay diverged between runs");
}
