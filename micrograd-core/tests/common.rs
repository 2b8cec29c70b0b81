use micrograd_core::{Graph, MicrogradError, Mlp};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Shared by several test binaries; not every binary uses every helper.
#[allow(dead_code)]
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A seeded network with one input, the shape the training driver uses.
#[allow(dead_code)]
pub(crate) fn seeded_mlp(graph: &mut Graph, layer_sizes: &[usize], seed: u64) -> Result<Mlp, MicrogradError> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mlp::new(graph, 1, layer_sizes, &mut rng)
}

#[allow(dead_code)]
pub(crate) fn io_error(e: std::io::Error) -> MicrogradError {
    MicrogradError::Io {
        path: "tempdir".to_string(),
        reason: e.to_string(),
    }
}
