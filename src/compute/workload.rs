use rand::Rng;
use std::time::{Duration, Instant};

/// Normalized 3x3 smoothing kernel, divided by `KERNEL_WEIGHT` after accumulation.
pub const KERNEL: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]];
pub const KERNEL_WEIGHT: f32 = 16.0;

/// Upper bound (exclusive) of the uniformly sampled cell values.
pub const SAMPLE_MAX: f32 = 255.0;

/// Outcome of one workload execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadStats {
    pub elapsed: Duration,
    pub mean: f64,
    pub stddev: f64,
}

/// Square grid of cells stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<f32>,
}

impl Grid {
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let cells = (0..size * size).map(|_| rng.gen_range(0.0..SAMPLE_MAX)).collect();
        Self { size, cells }
    }

    pub fn filled(size: usize, value: f32) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    /// Returns None if `cells` does not hold exactly `size * size` values.
    pub fn from_cells(size: usize, cells: Vec<f32>) -> Option<Self> {
        (cells.len() == size * size).then_some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row * self.size + col]
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// One smoothing pass with valid-convolution semantics:
    /// interior cells are computed, the 1-cell border is copied from the input.
    pub fn convolve(&self) -> Grid {
        let n = self.size;
        let mut out = self.cells.clone();

        for row in 1..n.saturating_sub(1) {
            for col in 1..n - 1 {
                let mut sum = 0.0f32;
                for (ki, kernel_row) in KERNEL.iter().enumerate() {
                    let base = (row + ki - 1) * n + col - 1;
                    for (kj, weight) in kernel_row.iter().enumerate() {
                        sum += self.cells[base + kj] * weight;
                    }
                }
                out[row * n + col] = sum / KERNEL_WEIGHT;
            }
        }

        Grid { size: n, cells: out }
    }

    /// Arithmetic mean and population standard deviation over all cells.
    pub fn stats(&self) -> (f64, f64) {
        if self.cells.is_empty() {
            return (0.0, 0.0);
        }
        let count = self.cells.len() as f64;
        let mean = self.cells.iter().map(|&v| v as f64).sum::<f64>() / count;
        let variance = self
            .cells
            .iter()
            .map(|&v| {
                let diff = v as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / count;
        (mean, variance.sqrt())
    }
}

/// What the compute worker runs for every unit. Called on a blocking thread;
/// a panic fails that one unit only.
pub trait Workload: Send + Sync + 'static {
    fn execute(&self, grid_size: usize, load: u32) -> WorkloadStats;
}

/// Random-grid smoothing, see [`run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvolutionWorkload;

impl Workload for ConvolutionWorkload {
    fn execute(&self, grid_size: usize, load: u32) -> WorkloadStats {
        run(grid_size, load)
    }
}

/// Runs the workload at `load` convolution passes over a fresh random grid.
pub fn run(grid_size: usize, load: u32) -> WorkloadStats {
    run_with_rng(grid_size, load, &mut rand::thread_rng())
}

/// Same as [`run`] with a caller-supplied RNG, for reproducible grids.
///
/// # Panics
/// A zero load or a grid smaller than the kernel is a caller defect.
pub fn run_with_rng<R: Rng + ?Sized>(grid_size: usize, load: u32, rng: &mut R) -> WorkloadStats {
    assert!(load >= 1, "workload load must be positive");
    assert!(grid_size >= 3, "grid must be at least 3x3");

    let start = Instant::now();

    let mut grid = Grid::random(grid_size, rng);
    for _ in 0..load {
        grid = grid.convolve();
    }
    let (mean, stddev) = grid.stats();

    WorkloadStats {
        elapsed: start.elapsed(),
        mean,
        stddev,
    }
}
