use chrono::{Local, TimeZone};
use proptest::prelude::*;
use vitalsim_core::{
    analysis::compute_anomaly_score,
    profile::{derive_baselines, SubjectProfile},
    simulation::{
        builder::SimulationBuilder,
        clock::FixedClock,
        engine::{SimulationEngine, CHANNEL_WEIGHTS},
        state::{GLUCOSE_RANGE, HEART_RATE_RANGE, SPO2_RANGE, UNIT_RANGE},
    },
};
use vitalsim_schemas::profile::Condition;

fn engine(id: &str, seed: u64, hour: u32) -> SimulationEngine {
    let profile = SubjectProfile {
        id: id.to_string(),
        name: None,
        age: 8,
        condition: Condition::Both,
        baselines: derive_baselines(8, Condition::Both),
    };
    SimulationBuilder::new()
        .with_profile(profile)
        .with_seed(seed)
        .with_clock(FixedClock::new(Local.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()))
        .build()
        .unwrap()
}

fn within(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

proptest! {
    #[test]
    fn generated_values_stay_clamped(seed in any::<u64>(), hour in 0u32..24, steps in 1usize..200) {
        let mut engine = engine("prop", seed, hour);
        for _ in 0..steps {
            engine.update_environment();
            engine.generate_random_event();
            let s = engine.snapshot();
            prop_assert!(within(s.glucose, GLUCOSE_RANGE));
            prop_assert!(within(s.heart_rate, HEART_RATE_RANGE));
            prop_assert!(within(s.spo2, SPO2_RANGE));
            prop_assert!(within(s.mood, UNIT_RANGE));
            prop_assert!(within(s.activity, UNIT_RANGE));
            prop_assert!(within(s.asthma_risk, UNIT_RANGE));
        }
    }

    #[test]
    fn anomaly_score_grows_away_from_range(a in 7.0f64..30.0, b in 7.0f64..30.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let range = (4.0, 7.0);
        let near_score = compute_anomaly_score(near, 5.5, range);
        let far_score = compute_anomaly_score(far, 5.5, range);
        prop_assert!(near_score <= far_score);
        prop_assert!((0.0..=1.0).contains(&far_score));

        let low_near = compute_anomaly_score(4.0 - (near - 7.0) / 10.0, 5.5, range);
        let low_far = compute_anomaly_score(4.0 - (far - 7.0) / 10.0, 5.5, range);
        prop_assert!(low_near <= low_far);
    }

    #[test]
    fn inside_range_never_exceeds_half(value in 4.0f64..=7.0, baseline in 4.1f64..6.9) {
        let score = compute_anomaly_score(value, baseline, (4.0, 7.0));
        prop_assert!((0.0..=0.5).contains(&score));
        prop_assert!(score <= compute_anomaly_score(7.5, baseline, (4.0, 7.0)));
    }
}

#[test]
fn channel_frequencies_follow_weights() {
    let mut engine = engine("weights", 2024, 10);
    let draws = 1000;
    let mut counts = [0usize; 7];
    for _ in 0..draws {
        let channel = engine.generate_random_event().channel();
        let slot = CHANNEL_WEIGHTS
            .iter()
            .position(|(c, _)| *c == channel)
            .expect("generated channel has a weight");
        counts[slot] += 1;
    }

    let total_weight: u32 = CHANNEL_WEIGHTS.iter().map(|(_, w)| w).sum();
    for ((channel, weight), count) in CHANNEL_WEIGHTS.iter().zip(counts) {
        let p = f64::from(*weight) / f64::from(total_weight);
        let expected = p * draws as f64;
        let tolerance = 4.0 * (draws as f64 * p * (1.0 - p)).sqrt() + 1.0;
        assert!(
            (count as f64 - expected).abs() <= tolerance,
            "{:?}: {} draws, expected about {}",
            channel,
            count,
            expected
        );
    }
    assert_eq!(counts.iter().sum::<usize>(), draws);
}

#[test]
fn subjects_do_not_share_state() {
    let mut reference = engine("alice", 7, 14);
    for _ in 0..50 {
        reference.generate_random_event();
    }

    let mut alice = engine("alice", 7, 14);
    let mut bob = engine("bob", 99, 14);
    for _ in 0..50 {
        alice.generate_random_event();
        bob.generate_random_event();
        bob.record_meal(Local.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap());
    }

    assert_eq!(alice.snapshot(), reference.snapshot());
    assert_eq!(alice.get_statistics(), reference.get_statistics());
    assert_eq!(alice.get_state().glucose_history().to_vec(), reference.get_state().glucose_history().to_vec());
    assert_eq!(bob.subject_id(), "bob");
}
