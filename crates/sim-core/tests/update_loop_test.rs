use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sim_core::{build_registry, LoopConfig, MemSpace, SharedStats, TagName, UpdateLoop};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// RNG that always yields the same word, so every equipment samples the same
/// reading within a tick.
struct ConstRng(u64);

impl RngCore for ConstRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }
}

fn fast_config() -> LoopConfig {
    LoopConfig {
        tick_interval: Duration::from_millis(5),
    }
}

#[test]
fn single_tick_writes_one_value_per_equipment_tag_pair() {
    let mut space = MemSpace::new();
    let registry = build_registry(&mut space, 3).unwrap();

    let rng = StdRng::seed_from_u64(1);
    let stats = Arc::new(SharedStats::default());
    let mut update_loop = UpdateLoop::new(registry, rng, fast_config(), Arc::clone(&stats));

    update_loop.tick().unwrap();

    assert_eq!(space.total_writes(), 3 * TagName::COUNT as u64);
    assert_eq!(stats.snapshot().ticks, 1);
    assert_eq!(stats.snapshot().values_written, 21);
    for n in 1..=3 {
        let name = format!("Equipment_{n}");
        for tag in TagName::ALL {
            let value = space.value(&name, tag).unwrap();
            assert!(
                tag.range().contains(&value),
                "{name}/{tag} out of range: {value}"
            );
        }
    }
}

#[test]
fn generator_runs_once_per_equipment_within_a_tick() {
    let mut space = MemSpace::new();
    let registry = build_registry(&mut space, 2).unwrap();

    let stats = Arc::new(SharedStats::default());
    let mut update_loop = UpdateLoop::new(registry, ConstRng(7), fast_config(), stats);

    update_loop.tick().unwrap();

    // With a constant RNG both per-equipment calls sample identically, so the
    // same Temperature lands on both equipment.
    let first = space.value("Equipment_1", TagName::Temperature).unwrap();
    let second = space.value("Equipment_2", TagName::Temperature).unwrap();
    assert_eq!(first, second);
    assert!(TagName::Temperature.range().contains(&first));
}

#[test]
fn cancellation_stops_the_loop_and_further_writes() {
    let mut space = MemSpace::new();
    let registry = build_registry(&mut space, 2).unwrap();
    let write_counter = space.write_counter();

    let stats = Arc::new(SharedStats::default());
    let stop = Arc::new(AtomicBool::new(false));

    let stop_loop = Arc::clone(&stop);
    let handle = thread::spawn(move || {
        let rng = StdRng::seed_from_u64(2);
        let mut update_loop = UpdateLoop::new(registry, rng, fast_config(), stats);
        update_loop.run(&stop_loop)
    });

    thread::sleep(Duration::from_millis(40));
    stop.store(true, Ordering::Relaxed);
    let final_stats = handle.join().unwrap().unwrap();

    assert!(final_stats.ticks >= 1);
    assert_eq!(
        final_stats.values_written,
        final_stats.ticks * 2 * TagName::COUNT as u64
    );

    let writes_at_stop = write_counter.load(Ordering::Relaxed);
    assert_eq!(writes_at_stop, final_stats.values_written);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(write_counter.load(Ordering::Relaxed), writes_at_stop);
}

#[test]
fn cancellation_before_the_first_tick_is_clean() {
    let mut space = MemSpace::new();
    let registry = build_registry(&mut space, 2).unwrap();

    let stop = AtomicBool::new(true);
    let rng = StdRng::seed_from_u64(3);
    let mut update_loop =
        UpdateLoop::new(registry, rng, fast_config(), Arc::new(SharedStats::default()));

    let stats = update_loop.run(&stop).unwrap();
    assert_eq!(stats.ticks, 0);
    assert_eq!(space.total_writes(), 0);
}

#[test]
fn build_failure_leaves_nothing_running() {
    // Third tag of the second equipment: 7 + 2 successful creates, then fail.
    let mut space = MemSpace::fail_variable_create_after(9);

    let err = build_registry(&mut space, 2).err().expect("build must fail");
    assert_eq!(
        err.to_string(),
        "failed to create variable node Torque under \"Equipment_2\""
    );
    assert_eq!(space.total_writes(), 0);
}
