use crate::common::*;

use clap::Parser;
use ndarray::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser, Debug, Clone)]
pub struct SimArgs {
    /// number of neurons
    #[arg(short = 'n', long, default_value_t = 30)]
    nodes: usize,

    /// number of blocks; neurons are split evenly in index order
    #[arg(short = 'k', long, default_value_t = 2)]
    blocks: usize,

    /// dimension of the weight basis
    #[arg(long, default_value_t = 1)]
    basis: usize,

    /// connection probability within a block
    #[arg(long, default_value_t = 0.8)]
    p_in: f64,

    /// connection probability between blocks
    #[arg(long, default_value_t = 0.1)]
    p_out: f64,

    /// shape of the Gamma weight distribution
    #[arg(long, default_value_t = 1.0)]
    kappa: f64,

    /// rate of the Gamma weight distribution in every block pair
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// forbid self-connections
    #[arg(long, default_value_t = false)]
    no_self_connections: bool,

    /// random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// output header
    #[arg(long, short, required = true)]
    out: Box<str>,
}

pub struct SimOut {
    pub adjacency: Array2<f64>,
    pub weights: Array2<f64>,
    pub blocks: Vec<usize>,
}

/// Build the ground-truth generator and draw one network from it.
pub fn generate_network(args: &SimArgs) -> anyhow::Result<SimOut> {
    if args.blocks == 0 || args.blocks > args.nodes {
        anyhow::bail!(
            "need between 1 and {} blocks, got {}",
            args.nodes,
            args.blocks
        );
    }

    let k = args.blocks;
    let b = args.basis;
    let population = Population::new(args.nodes, b)?;
    let mut rng = SmallRng::seed_from_u64(args.seed);

    let options = SbmOptions {
        kappa: args.kappa,
        allow_self_connections: !args.no_self_connections,
        ..SbmOptions::with_blocks(k)
    };

    let p = Array2::from_shape_fn((k, k), |(c1, c2)| {
        if c1 == c2 {
            args.p_in
        } else {
            args.p_out
        }
    });

    let init = SbmInit {
        c: Some(balanced_blocks(args.nodes, k)),
        m: Some(Array1::from_elem(k, 1.0 / k as f64)),
        p: Some(p.into()),
        mu: Some(Array3::zeros((k, k, b))),
        sigma: Some(Array4::from_shape_fn((k, k, b, b), |(_, _, d, e)| {
            if d == e {
                1.0
            } else {
                0.0
            }
        })),
        v: Some(Array2::from_elem((k, k), args.scale)),
    };

    let sbm = StochasticBlockModel::new(&population, options, init, &mut rng)?;
    let (adjacency, weights) = sbm.generate(&mut rng)?;

    Ok(SimOut {
        adjacency,
        weights,
        blocks: sbm.assignments().to_vec(),
    })
}

pub fn run_sim_network(args: SimArgs) -> anyhow::Result<()> {
    env_logger::init();

    info!(
        "Simulating a {}-node network with {} blocks ...",
        args.nodes, args.blocks
    );
    let sim_out = generate_network(&args)?;
    info!(
        "{} edges out of {} pairs",
        sim_out.adjacency.sum(),
        args.nodes * args.nodes
    );

    let output = args.out.to_string();
    mkdir(&output)?;

    let adj_file = out_file(&output, "adjacency.tsv.gz");
    let weight_file = out_file(&output, "weights.tsv.gz");
    let block_file = out_file(&output, "blocks.txt.gz");

    write_matrix(&sim_out.adjacency, &adj_file)?;
    write_matrix(&sim_out.weights, &weight_file)?;
    write_types(&sim_out.blocks, &block_file)?;

    info!(
        "wrote adjacency, weights and blocks:\n{}\n{}\n{}",
        adj_file, weight_file, block_file
    );
    Ok(())
}
