use criterion::measurement::Measurement;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use sparse_rsvd::randomized::projection::gaussian_test_matrix;
use sparse_rsvd::SparseProduct;
use std::time::Duration;

#[derive(Clone)]
pub struct ProductConfig {
    seed: u64,
    matrix_sizes: Vec<(usize, usize)>,
    densities: Vec<f64>,
    block_widths: Vec<usize>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            matrix_sizes: vec![(1000, 1000), (10000, 5000), (100000, 20000)],
            densities: vec![0.001, 0.01],
            block_widths: vec![20, 110],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_matrix(rows: usize, cols: usize, density: f64, seed: u64) -> CsrMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut coo = CooMatrix::new(rows, cols);
    let total_elements = (rows * cols) as f64 * density;
    let value_dist = Uniform::try_from(0.0..1.0).unwrap();
    let row_dist = Uniform::try_from(0..rows).unwrap();
    let col_dist = Uniform::try_from(0..cols).unwrap();

    for _ in 0..total_elements as usize {
        coo.push(row_dist.sample(&mut rng), col_dist.sample(&mut rng), value_dist.sample(&mut rng));
    }

    (&coo).into()
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &ProductConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_csr_products(c: &mut Criterion) {
    let config = ProductConfig::default();
    let mut group = configure_group(c, "CSR_Dense_Products", &config);

    for &(rows, cols) in config.matrix_sizes.iter() {
        for &density in config.densities.iter() {
            let seed = config.seed + (rows * cols) as u64;
            let matrix = create_test_matrix(rows, cols, density, seed);

            for &width in config.block_widths.iter() {
                let label = format!("{}x{}_d{}_k{}", rows, cols, density, width);
                let omega = gaussian_test_matrix(cols, width, seed);
                let y: DMatrix<f64> = gaussian_test_matrix(rows, width, seed + 1);

                group.bench_with_input(BenchmarkId::new("A_times_X", &label), &width, |b, _| {
                    b.iter(|| black_box(matrix.mul_dense(&omega).unwrap()));
                });

                group.bench_with_input(BenchmarkId::new("At_times_Y", &label), &width, |b, _| {
                    b.iter(|| black_box(matrix.transpose_mul_dense(&y).unwrap()));
                });
            }
        }
    }
    group.finish();
}

criterion_group!(benches, bench_csr_products);
criterion_main!(benches);
