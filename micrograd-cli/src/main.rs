use clap::Parser;
use log::{error, info};
use micrograd_core::model;
use micrograd_core::{Graph, MicrogradError, Module, Sgd};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

mod train;

#[derive(Parser, Debug)]
#[command(
    name = "micrograd",
    about = "Train a small multilayer perceptron with scalar autodiff",
    long_about = "Loads (or creates) a multilayer perceptron, trains it with plain gradient descent\nto tell percentages above 50 from those below, prints a few predictions and saves\nthe weights back to disk.",
    version
)]
struct Cli {
    /// Model file to load from and save to
    #[arg(long, default_value = "model.json")]
    model: PathBuf,

    /// Number of training iterations
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// Gradient descent step size
    #[arg(long, default_value = "0.01")]
    learning_rate: f64,

    /// Neurons per layer for a new model (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "3,4,4,1")]
    layers: Vec<usize>,

    /// Seed for weight initialisation (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore an existing model file and start from random weights
    #[arg(long)]
    fresh: bool,

    /// Do not write the trained model back
    #[arg(long)]
    no_save: bool,

    /// Print the final loss graph as a tree
    #[arg(long)]
    print_graph: bool,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), MicrogradError> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut graph = Graph::new();
    let mlp = train::load_or_create(&mut graph, &cli.model, cli.fresh, &cli.layers, &mut rng)?;
    let mut optimizer = Sgd::new(mlp.parameters(), cli.learning_rate)?;

    let history = train::train(&mut graph, &mlp, &mut optimizer, cli.iterations)?;
    if let (Some(first), Some(last)) = (history.first(), history.last()) {
        info!("Loss went from {:.6} to {:.6} over {} iterations", first, last, history.len());
    }

    if cli.print_graph {
        println!("{}", train::render_loss_graph(&mut graph, &mlp)?);
    }

    for &x in &train::TEST_INPUTS {
        let output = train::predict(&mut graph, &mlp, x)?;
        println!(
            "Input: {:.1}, Output: {:.4} (Expected: {})",
            x * 100.0,
            output,
            train::expected_class(x)
        );
    }

    if cli.no_save {
        info!("Skipping save (--no-save)");
    } else {
        model::save(&cli.model, &mlp.state(&graph)?)?;
        info!("Saved model to {}", cli.model.display());
    }
    Ok(())
}
