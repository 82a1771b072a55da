use anyhow::Context;
use clap::Parser;

use sparse_rsvd::config::CliArgs;
use sparse_rsvd::io::{infer_shape, read_triplets, write_factorization};
use sparse_rsvd::{from_triplets, Factorization};

fn run(args: &CliArgs) -> anyhow::Result<Factorization> {
    let svd = args.to_builder().context("invalid arguments")?.build();

    let input = args.input_path();
    log::info!("Reading CSV {}", input.display());
    let triplets = read_triplets(&input).context("reading triplets")?;
    let (nrows, ncols) = args.shape().unwrap_or_else(|| infer_shape(&triplets));
    let matrix = from_triplets(nrows, ncols, &triplets).context("building the sparse matrix")?;

    log::info!("Perform SVD on {}x{} matrix with {} non-zeros", nrows, ncols, matrix.nnz());
    let factors = svd.fit(&matrix).context("randomized SVD")?;

    write_factorization(&factors, &args.left_path(), &args.right_path(), &args.sigma_path())
        .context("writing factors")?;
    log::info!(
        "saved P*S to {}, V to {}, singular values to {}",
        args.left_path().display(),
        args.right_path().display(),
        args.sigma_path().display()
    );
    Ok(factors)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let result = match args.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("building the thread pool")
            .and_then(|pool| pool.install(|| run(&args))),
        None => run(&args),
    };

    match result {
        Ok(factors) => {
            let d = factors.diagnostics();
            log::info!(
                "done: rank {} (requested {}), sketch width {}, transposed: {}",
                factors.rank(),
                d.requested_rank,
                d.sketch_width,
                d.transposed
            );
        }
        Err(err) => {
            log::error!("{:#}", err);
            std::process::exit(1);
        }
    }
}
