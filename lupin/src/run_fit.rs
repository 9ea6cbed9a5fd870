use crate::common::*;

use clap::Parser;
use glm_network::Broadcast;
use mcmc_util::{GibbsRunner, McmcChain};
use ndarray::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser, Debug, Clone)]
pub struct FitArgs {
    /// binary adjacency matrix, one row per line (`.gz` allowed)
    #[arg(required = true)]
    adjacency_file: Box<str>,

    /// edge weight matrix with the same shape as the adjacency
    #[arg(required = true)]
    weights_file: Box<str>,

    /// number of blocks
    #[arg(short = 'k', long, default_value_t = 2)]
    blocks: usize,

    /// dimension of the weight basis
    #[arg(long, default_value_t = 1)]
    basis: usize,

    /// Dirichlet concentration over block sizes
    #[arg(long, default_value_t = 1.0)]
    pi: f64,

    /// Beta prior pseudo-count of absent edges
    #[arg(long, default_value_t = 0.1)]
    tau0: f64,

    /// Beta prior pseudo-count of present edges
    #[arg(long, default_value_t = 0.1)]
    tau1: f64,

    /// prior weight mean; also the Gamma shape prior of the weight scale,
    /// so it must be positive
    #[arg(long, default_value_t = 1.0)]
    mu0: f64,

    /// prior mean precision scaling
    #[arg(long, default_value_t = 1.0)]
    kappa0: f64,

    /// prior degrees of freedom, greater than basis - 1
    #[arg(long, default_value_t = 1.0)]
    nu0: f64,

    /// prior weight covariance scale; also the Gamma rate prior of the
    /// weight scale
    #[arg(long, default_value_t = 1.0)]
    sigma0: f64,

    /// shape of the Gamma weight distribution
    #[arg(long, default_value_t = 1.0)]
    kappa: f64,

    /// forbid self-connections
    #[arg(long, default_value_t = false)]
    no_self_connections: bool,

    /// number of samples to keep
    #[arg(short = 's', long, default_value_t = 100)]
    samples: usize,

    /// number of warm-up sweeps to discard
    #[arg(short = 'w', long, default_value_t = 100)]
    warmup: usize,

    /// keep every `thin`-th sweep after warm-up
    #[arg(long, default_value_t = 1)]
    thin: usize,

    /// random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// report time spent in each Gibbs update
    #[arg(long, default_value_t = false)]
    profile: bool,

    /// output header
    #[arg(long, short, required = true)]
    out: Box<str>,

    /// verbosity
    #[arg(long, short)]
    verbose: bool,
}

impl FitArgs {
    fn sbm_options(&self) -> SbmOptions {
        SbmOptions {
            num_blocks: self.blocks,
            pi: Broadcast::Scalar(self.pi),
            tau0: self.tau0,
            tau1: self.tau1,
            mu0: self.mu0,
            kappa0: self.kappa0,
            nu0: self.nu0,
            sigma0: self.sigma0,
            kappa: self.kappa,
            allow_self_connections: !self.no_self_connections,
        }
    }

    fn runner(&self) -> GibbsRunner {
        GibbsRunner {
            n_samples: self.samples,
            warmup: self.warmup,
            thin: self.thin,
            seed: self.seed.wrapping_add(1),
            show_progress: self.verbose,
        }
    }
}

pub struct FitOut {
    pub chain: McmcChain<SbmSample>,
    pub model: GibbsSbm,
}

/// Draw an initial model from the prior and run the Gibbs chain on `data`.
pub fn fit_network(args: &FitArgs, data: NetworkData) -> anyhow::Result<FitOut> {
    if args.samples == 0 {
        anyhow::bail!("need at least one sample");
    }

    let population = Population::new(data.num_nodes(), args.basis)?;
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let sbm = StochasticBlockModel::new(
        &population,
        args.sbm_options(),
        SbmInit::default(),
        &mut rng,
    )?;

    let mut model = GibbsSbm::new(sbm, data, args.profile)?;

    let runner = args.runner();
    info!(
        "Gibbs sampling: {} sweeps, {} kept",
        runner.total_sweeps(),
        runner.n_samples
    );
    let chain = runner.run(&mut model)?;

    Ok(FitOut { chain, model })
}

pub fn run_fit_network(args: FitArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let adjacency = read_matrix(&args.adjacency_file)?;
    let weights = read_matrix(&args.weights_file)?;
    info!(
        "read {} x {} adjacency from {}",
        adjacency.nrows(),
        adjacency.ncols(),
        args.adjacency_file
    );
    let data = NetworkData::new(adjacency, weights)?;

    let FitOut { chain, model } = fit_network(&args, data)?;

    if let Some(timer) = model.sampler().timer() {
        info!("time per Gibbs update:");
        timer.report();
    }

    let n = model.model().num_nodes();
    let k = model.model().num_blocks();
    let summary = ChainSummary::from_chain(&chain, n, k)?;

    let output = args.out.to_string();
    mkdir(&output)?;

    let log_prior_file = out_file(&output, "log_prior.txt.gz");
    let block_file = out_file(&output, "blocks.tsv.gz");
    let m_file = out_file(&output, "m_mean.tsv.gz");

    write_types(&chain.log_probs, &log_prior_file)?;
    write_matrix(&block_trace(&chain, n), &block_file)?;
    write_matrix(
        &summary.mean.block_weights().to_owned().insert_axis(Axis(1)),
        &m_file,
    )?;
    info!("wrote {}\n{}\n{}", log_prior_file, block_file, m_file);

    let tables: [(&str, fn(&SbmSample) -> Array2<f64>); 2] = [
        ("p", SbmSample::connection_probs),
        ("v", SbmSample::weight_scales),
    ];
    for (name, table) in tables {
        let mean_file = out_file(&output, &format!("{}_mean.tsv.gz", name));
        let lo_file = out_file(&output, &format!("{}_q025.tsv.gz", name));
        let hi_file = out_file(&output, &format!("{}_q975.tsv.gz", name));
        write_matrix(&table(&summary.mean), &mean_file)?;
        write_matrix(&table(&summary.lower), &lo_file)?;
        write_matrix(&table(&summary.upper), &hi_file)?;
        info!("wrote {}\n{}\n{}", mean_file, lo_file, hi_file);

        if let Some(sd) = &summary.sd {
            let sd_file = out_file(&output, &format!("{}_sd.tsv.gz", name));
            write_matrix(&table(sd), &sd_file)?;
            info!("wrote {}", sd_file);
        }
    }

    if chain.log_probs.iter().any(|x| x.is_nan()) {
        warn!("log prior undefined for some samples (mu0 and sigma0 must be positive)");
    }

    Ok(())
}

/// Element-wise posterior summaries of a chain, each in the sample layout.
pub struct ChainSummary {
    pub mean: SbmSample,
    /// Posterior standard deviation; needs at least two samples
    pub sd: Option<SbmSample>,
    /// 2.5% quantile
    pub lower: SbmSample,
    /// 97.5% quantile
    pub upper: SbmSample,
}

impl ChainSummary {
    pub fn from_chain(chain: &McmcChain<SbmSample>, n: usize, k: usize) -> anyhow::Result<Self> {
        let reshape = |values: Vec<f64>| {
            SbmSample::from_values(n, k, values).ok_or(anyhow::anyhow!("empty chain"))
        };
        let sd = if chain.n_samples() > 1 {
            let var = chain.posterior_variance();
            Some(reshape(var.into_iter().map(f64::sqrt).collect())?)
        } else {
            None
        };
        Ok(ChainSummary {
            mean: reshape(chain.posterior_mean())?,
            sd,
            lower: reshape(chain.quantile(0.025))?,
            upper: reshape(chain.quantile(0.975))?,
        })
    }
}

/// Sample × node matrix of block assignments
fn block_trace(chain: &McmcChain<SbmSample>, n: usize) -> Array2<usize> {
    let mut trace = Array2::zeros((chain.n_samples(), n));
    for (mut row, sample) in trace.rows_mut().into_iter().zip(chain.samples.iter()) {
        for (x, &c) in row.iter_mut().zip(sample.assignments()) {
            *x = c as usize;
        }
    }
    trace
}
