//! Integration tests for probsearch-core
//!
//! These tests drive the estimator end to end over recorded comparison
//! histories.

use probsearch_core::{
    compute_posterior, Estimator, EstimatorConfig, ObjectiveScale, PosteriorIntegration,
    PosteriorMode, ReplaySource, Test, TestHistory,
};

fn bracket() -> Vec<Test> {
    vec![Test::greater(3.0), Test::less(10.0)]
}

fn narrowing_sequence() -> Vec<Test> {
    vec![
        Test::greater(5.0),
        Test::less(9.0),
        Test::greater(7.0),
        Test::less(8.5),
        Test::greater(7.5),
        Test::less(8.2),
        Test::greater(6.0),
        Test::less(9.5),
    ]
}

/// Posterior (mean, std_dev) bit patterns after each step of `narrowing_sequence()`
const MAP_TRACE: [(u64, u64); 8] = [
    (0x402a999999999988, 0x3ff0000000000000),
    (0x401c000000000000, 0x3fc999999999999f),
    (0x401ffffffffffffe, 0x3fa99999999999a8),
    (0x401f199999999998, 0x3fa333333333333e),
    (0x40200ccccccccccc, 0x3f899999999999b8),
    (0x401f555555555554, 0x3f91111111111108),
    (0x401f622222222220, 0x3f9777777777776e),
    (0x401f266666666666, 0x3f79999999999aa0),
];

const INTEGRATED_TRACE: [(u64, u64); 8] = [
    (0x402cb9b86a90d58b, 0x40135db8d34798a3),
    (0x401c000000000000, 0x3ff038208db0a8d9),
    (0x4020000b0cab329b, 0x3fcfdbb8e08564d6),
    (0x401ef0499dd58f64, 0x3fc814298d79f189),
    (0x4020006484e61809, 0x3fb00dc528c91f99),
    (0x401f65891478b909, 0x3fb565b1a24d260f),
    (0x401f5fd4f5a1ce4b, 0x3fbd64fbe7bed89e),
    (0x401f668589698576, 0x3f9ff9327e853bbe),
];

/// Noisy comparisons around 5 whose peak likelihood is below the 2D tolerance
fn noisy_history() -> Vec<Test> {
    vec![
        Test::greater(5.2),
        Test::less(3.3),
        Test::less(7.1),
        Test::greater(1.9),
        Test::greater(1.2),
        Test::greater(3.0),
        Test::less(5.0),
        Test::less(8.6),
        Test::greater(4.2),
        Test::less(7.5),
        Test::less(8.0),
        Test::greater(5.5),
    ]
}

fn config(mode: PosteriorMode) -> EstimatorConfig {
    EstimatorConfig {
        mode,
        ..EstimatorConfig::default()
    }
}

#[test]
fn test_map_posterior_for_bracket() {
    let history = TestHistory::from_tests(bracket()).unwrap();
    let estimate = compute_posterior(&history, &EstimatorConfig::default()).unwrap();

    assert_eq!(estimate.seed.mean, 6.5);
    assert_eq!(estimate.seed.std_dev, 1.75);
    assert!((estimate.posterior.mean - 6.5).abs() < 1e-9);
    assert!((estimate.posterior.std_dev - 0.35).abs() < 1e-9);
    assert!(estimate.integration.is_none());
}

#[test]
fn test_log_objective_finds_same_map() {
    let history = TestHistory::from_tests(bracket()).unwrap();
    let cfg = EstimatorConfig {
        objective: ObjectiveScale::LogProbability,
        ..EstimatorConfig::default()
    };
    let estimate = compute_posterior(&history, &cfg).unwrap();

    assert!((estimate.posterior.mean - 6.5).abs() < 1e-9);
    assert!((estimate.posterior.std_dev - 0.35).abs() < 1e-9);
}

#[test]
fn test_integrated_posterior_for_bracket() {
    let history = TestHistory::from_tests(bracket()).unwrap();
    let estimate = compute_posterior(&history, &config(PosteriorMode::Integrated)).unwrap();

    // Integration is centered on the MAP point
    assert!((estimate.map.x - 6.5).abs() < 1e-9);

    let posterior = estimate.posterior;
    assert!((posterior.mean - 6.5).abs() < 1e-6, "mean = {}", posterior.mean);
    assert!(posterior.std_dev > 1.7 && posterior.std_dev < 1.8, "std_dev = {}", posterior.std_dev);

    match estimate.integration {
        Some(PosteriorIntegration::Joint(integration)) => {
            assert!(integration.mass > 0.0);
            assert!(integration.regions > 1);
            assert!(integration.evaluations > 5);
        }
        other => panic!("Expected a joint integration, got {:?}", other),
    }
}

#[test]
fn test_integrated_std_dev_keeps_map_mean() {
    let history = TestHistory::from_tests(bracket()).unwrap();
    let estimate = compute_posterior(&history, &config(PosteriorMode::IntegratedStdDev)).unwrap();

    assert_eq!(estimate.posterior.mean, estimate.map.x);
    assert!(
        (estimate.posterior.std_dev - 1.6525).abs() < 0.01,
        "std_dev = {}",
        estimate.posterior.std_dev
    );

    let integration = estimate.integration.unwrap();
    assert!(matches!(integration, PosteriorIntegration::StdDev(_)));
    assert!(integration.converged());
    assert!(integration.mass() > 0.0);
}

#[test]
fn test_sequence_narrows_around_target() {
    let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
    let mut source = ReplaySource::new(narrowing_sequence());
    let trajectory = estimator.run(&mut source, 100).unwrap();

    assert_eq!(trajectory.len(), 8);

    // Once both outcomes are seen, means stay inside the probed range
    for mean in &trajectory.means()[1..] {
        assert!(*mean > 5.0 && *mean < 9.5, "mean = {}", mean);
    }

    let last = trajectory.final_posterior().unwrap();
    assert!((last.mean - 7.7875).abs() < 1e-6, "mean = {}", last.mean);
    assert!(last.std_dev < 0.05, "std_dev = {}", last.std_dev);
    assert_eq!(estimator.posterior(), last);
}

fn trace_bits(mode: PosteriorMode) -> Vec<(u64, u64)> {
    let mut estimator = Estimator::new(config(mode)).unwrap();
    let trajectory = estimator
        .run(&mut ReplaySource::new(narrowing_sequence()), 100)
        .unwrap();
    trajectory
        .steps
        .iter()
        .map(|step| {
            let posterior = step.posterior();
            (posterior.mean.to_bits(), posterior.std_dev.to_bits())
        })
        .collect()
}

#[test]
fn test_map_trace_is_bit_exact() {
    assert_eq!(trace_bits(PosteriorMode::Map), MAP_TRACE);
}

#[test]
fn test_integrated_trace_is_bit_exact() {
    assert_eq!(trace_bits(PosteriorMode::Integrated), INTEGRATED_TRACE);
}

#[test]
fn test_run_stops_at_step_limit() {
    let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
    let mut source = ReplaySource::new(narrowing_sequence());
    let trajectory = estimator.run(&mut source, 3).unwrap();

    assert_eq!(trajectory.len(), 3);
    assert_eq!(source.remaining(), 5);
    assert_eq!(estimator.history().len(), 3);
}

#[test]
fn test_replay_is_deterministic() {
    let run = || {
        let mut estimator = Estimator::new(config(PosteriorMode::Integrated)).unwrap();
        estimator.run(&mut ReplaySource::new(bracket()), 10).unwrap()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_one_sided_history_stays_finite() {
    let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();

    let step = estimator.observe(Test::greater(7.0)).unwrap();
    assert_eq!(step.estimate.seed.mean, 0.0);
    assert_eq!(step.estimate.seed.std_dev, 1.0);

    let posterior = step.posterior();
    assert!(posterior.mean.is_finite());
    assert!(posterior.mean > 7.0, "mean = {}", posterior.mean);
}

#[test]
fn test_zero_mass_falls_back_to_map() {
    // Contradictory enough that the likelihood underflows everywhere
    let mut tests = Vec::new();
    for _ in 0..1100 {
        tests.push(Test::greater(10.0));
        tests.push(Test::less(0.0));
    }
    let history = TestHistory::from_tests(tests).unwrap();
    let estimate = compute_posterior(&history, &config(PosteriorMode::Integrated)).unwrap();

    assert_eq!(estimate.map.value, 0.0);
    assert_eq!(estimate.posterior.mean, estimate.map.x);
    assert_eq!(estimate.posterior.std_dev, estimate.map.y);
    assert_eq!(estimate.integration.unwrap().mass(), 0.0);
}

#[test]
fn test_source_errors_propagate() {
    let mut estimator = Estimator::new(EstimatorConfig::default()).unwrap();
    let mut calls = 0;
    let mut source = |_: &probsearch_core::CandidateDistribution| -> Result<Option<Test>, String> {
        calls += 1;
        if calls > 2 {
            Err("oracle offline".to_string())
        } else {
            Ok(Some(Test::greater(calls as f64)))
        }
    };

    let result = estimator.run(&mut source, 5);
    assert!(matches!(
        result,
        Err(probsearch_core::RunError::Source(ref e)) if e == "oracle offline"
    ));
    assert_eq!(estimator.history().len(), 2);
}

#[test]
fn test_trajectory_serializes() {
    let mut estimator = Estimator::new(config(PosteriorMode::IntegratedStdDev)).unwrap();
    let trajectory = estimator.run(&mut ReplaySource::new(bracket()), 2).unwrap();

    let json = serde_json::to_value(&trajectory).unwrap();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1]["test"]["outcome"], "less");
    assert_eq!(steps[1]["estimate"]["integration"]["kind"], "std-dev");
}

#[test]
fn test_integrated_posterior_at_large_magnitude() {
    let (low, high) = (2e17, 2e17 + 2048.0);
    let history = TestHistory::from_tests([Test::greater(low), Test::less(high)]).unwrap();
    let estimate = compute_posterior(&history, &config(PosteriorMode::Integrated)).unwrap();

    let posterior = estimate.posterior;
    assert!(posterior.mean > low && posterior.mean < high, "mean = {}", posterior.mean);
    assert!(posterior.std_dev > 0.0 && posterior.std_dev.is_finite());
    assert!(estimate.integration.unwrap().converged());
}

#[test]
fn test_collapsed_region_keeps_map_point() {
    let history =
        TestHistory::from_tests([Test::greater(1e18), Test::less(1e18 + 1024.0)]).unwrap();
    let mut cfg = config(PosteriorMode::Integrated);
    cfg.region.mean_half_width_scale = 0.0;

    let estimate = compute_posterior(&history, &cfg).unwrap();
    assert!(estimate.integration.is_none());
    assert_eq!(estimate.posterior.mean, estimate.map.x);
    assert_eq!(estimate.posterior.std_dev, estimate.map.y);
}

#[test]
fn test_peak_normalized_integration_refines_low_likelihood() {
    let history = TestHistory::from_tests(noisy_history()).unwrap();

    let raw = compute_posterior(&history, &config(PosteriorMode::Integrated)).unwrap();
    assert!(raw.map.value < 0.05, "peak = {}", raw.map.value);
    let Some(PosteriorIntegration::Joint(raw_integration)) = raw.integration else {
        panic!("Expected a joint integration, got {:?}", raw.integration);
    };
    // Every value is below the tolerance: the whole region closes at once
    assert_eq!(raw_integration.regions, 1);
    assert_eq!(raw_integration.max_depth_reached, 0);

    let cfg = EstimatorConfig {
        normalize_to_peak: true,
        ..config(PosteriorMode::Integrated)
    };
    let normalized = compute_posterior(&history, &cfg).unwrap();
    assert_eq!(normalized.map, raw.map);
    let Some(PosteriorIntegration::Joint(integration)) = normalized.integration else {
        panic!("Expected a joint integration, got {:?}", normalized.integration);
    };
    assert!(integration.regions > 1);
    assert!(integration.converged);
    assert!(
        normalized.posterior.std_dev < raw.posterior.std_dev,
        "{} vs {}",
        normalized.posterior.std_dev,
        raw.posterior.std_dev
    );
}
