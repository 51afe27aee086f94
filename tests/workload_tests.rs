use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use telemetry_lab::compute::workload::{self, Grid, SAMPLE_MAX};

#[test]
fn test_convolution_keeps_border_from_input() {
    let mut rng = StdRng::seed_from_u64(7);
    let grid = Grid::random(16, &mut rng);
    let out = grid.convolve();

    for i in 0..16 {
        assert_eq!(out.get(0, i), grid.get(0, i), "top border must be copied");
        assert_eq!(out.get(15, i), grid.get(15, i), "bottom border must be copied");
        assert_eq!(out.get(i, 0), grid.get(i, 0), "left border must be copied");
        assert_eq!(out.get(i, 15), grid.get(i, 15), "right border must be copied");
    }
}

#[test]
fn test_convolution_of_constant_grid_is_constant() {
    let grid = Grid::filled(8, 42.0);
    let out = grid.convolve();
    assert!(out.cells().iter().all(|&v| (v - 42.0).abs() < 1e-4));
}

#[test]
fn test_convolution_weights_center_cell() {
    // Single hot cell in the middle of a 3x3 grid: only the center is computed.
    let mut cells = vec![0.0; 9];
    cells[4] = 16.0;
    let grid = Grid::from_cells(3, cells).expect("3x3 grid");
    let out = grid.convolve();

    assert_eq!(out.get(1, 1), 4.0, "center weight is 4/16");
    assert_eq!(out.get(0, 0), 0.0, "border untouched");
}

#[test]
fn test_from_cells_rejects_wrong_length() {
    assert!(Grid::from_cells(3, vec![0.0; 8]).is_none());
}

#[test]
fn test_population_statistics() {
    let grid = Grid::from_cells(2, vec![2.0, 4.0, 4.0, 6.0]).expect("2x2 grid");
    let (mean, stddev) = grid.stats();
    assert!((mean - 4.0).abs() < 1e-9);
    // Population variance = (4 + 0 + 0 + 4) / 4 = 2
    assert!((stddev - 2.0f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_random_grid_within_sample_range() {
    let mut rng = StdRng::seed_from_u64(1);
    let grid = Grid::random(32, &mut rng);
    assert!(grid.cells().iter().all(|&v| (0.0..SAMPLE_MAX).contains(&v)));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let a = workload::run_with_rng(32, 2, &mut StdRng::seed_from_u64(99));
    let b = workload::run_with_rng(32, 2, &mut StdRng::seed_from_u64(99));
    assert_eq!(a.mean, b.mean);
    assert_eq!(a.stddev, b.stddev);
}

#[test]
fn test_more_passes_smooth_more() {
    let light = workload::run_with_rng(64, 1, &mut StdRng::seed_from_u64(5));
    let heavy = workload::run_with_rng(64, 5, &mut StdRng::seed_from_u64(5));

    assert!(heavy.stddev < light.stddev, "extra smoothing passes must reduce spread");
    assert!(light.stddev >= 0.0 && heavy.stddev >= 0.0);
    assert!(heavy.mean > 0.0 && heavy.mean < SAMPLE_MAX as f64);
}

#[test]
fn test_elapsed_grows_with_load() {
    // Summed over a few runs to stay clear of timer granularity.
    let total = |load: u32| -> Duration {
        (0..3).map(|_| workload::run(256, load).elapsed).sum()
    };

    let light = total(1);
    let heavy = total(5);
    assert!(heavy >= light, "load 5 ({heavy:?}) should not be cheaper than load 1 ({light:?})");
}

#[test]
#[should_panic(expected = "load must be positive")]
fn test_zero_load_is_a_defect() {
    workload::run(16, 0);
}
