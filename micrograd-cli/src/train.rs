use log::{debug, info, warn};
use micrograd_core::model::{self, Mlp};
use micrograd_core::{Graph, MicrogradError, Module, NodeId, Optimizer, Sgd, SquaredErrorLoss};
use rand::Rng;
use std::path::Path;

/// Training inputs: percentages scaled to [0, 1].
pub const TRAIN_INPUTS: [f64; 8] = [0.75, 0.25, 1.0, 0.1, 0.505, 0.495, 0.8, 0.3];

/// `1.0` for inputs above one half, `-1.0` otherwise.
pub const TRAIN_TARGETS: [f64; 8] = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];

pub const TEST_INPUTS: [f64; 4] = [0.6, 0.4, 0.1, 0.9];

/// Networks are fed a single scaled percentage.
pub const NUM_INPUTS: usize = 1;

/// Restores the network saved at `path`, or builds a fresh one with
/// `layer_sizes` when `fresh` is set or the file cannot be used.
///
/// A missing, unreadable or incompatible model file is not an error: it is
/// reported with `warn!` and training starts from random weights.
pub fn load_or_create<R: Rng + ?Sized>(
    graph: &mut Graph,
    path: &Path,
    fresh: bool,
    layer_sizes: &[usize],
    rng: &mut R,
) -> Result<Mlp, MicrogradError> {
    if !fresh {
        if path.exists() {
            match restore(graph, path) {
                Ok(mlp) => {
                    info!(
                        "Loaded model from {} (layers {:?})",
                        path.display(),
                        mlp.layer_sizes()
                    );
                    return Ok(mlp);
                }
                Err(e) => warn!("Could not use {}: {}. Starting from a fresh model", path.display(), e),
            }
        } else {
            warn!("No model at {}, starting from a fresh model", path.display());
        }
    }

    check_single_output(layer_sizes)?;
    let mlp = Mlp::new(graph, NUM_INPUTS, layer_sizes, rng)?;
    info!(
        "Created model with layers {:?} ({} parameters)",
        mlp.layer_sizes(),
        mlp.num_parameters()
    );
    Ok(mlp)
}

fn restore(graph: &mut Graph, path: &Path) -> Result<Mlp, MicrogradError> {
    let state = model::load(path)?;
    if state.num_inputs != NUM_INPUTS {
        return Err(MicrogradError::StateMismatch(format!(
            "model takes {} inputs, the training data has {}",
            state.num_inputs, NUM_INPUTS
        )));
    }
    check_single_output(&state.layer_sizes)?;
    let mark = graph.checkpoint();
    Mlp::from_state(graph, &state).map_err(|e| {
        graph.rewind(mark);
        e
    })
}

/// Every input is scored by a single output neuron.
fn check_single_output(layer_sizes: &[usize]) -> Result<(), MicrogradError> {
    match layer_sizes.last() {
        Some(1) => Ok(()),
        _ => Err(MicrogradError::InvalidConfig(format!(
            "the last layer must have exactly one neuron, got layers {:?}",
            layer_sizes
        ))),
    }
}

/// Builds the summed squared-error loss of `mlp` over every `(input, target)`
/// pair and returns the loss node. Nothing is rewound.
pub fn build_loss(
    graph: &mut Graph,
    mlp: &Mlp,
    inputs: &[f64],
    targets: &[f64],
) -> Result<NodeId, MicrogradError> {
    let mut outputs = Vec::with_capacity(inputs.len());
    for &x in inputs {
        let out = mlp.forward_values(graph, &[x])?;
        outputs.extend(out);
    }
    SquaredErrorLoss::default().calculate(graph, &outputs, targets)
}

/// One iteration of gradient descent. Returns the loss before the update.
///
/// All nodes built for the iteration are dropped again and the parameter
/// gradients cleared, so the graph holds only the parameters afterwards. This
/// also holds when the iteration fails.
pub fn train_step(
    graph: &mut Graph,
    mlp: &Mlp,
    optimizer: &mut Sgd,
    inputs: &[f64],
    targets: &[f64],
) -> Result<f64, MicrogradError> {
    let mark = graph.checkpoint();
    let result = build_loss(graph, mlp, inputs, targets).and_then(|loss| {
        let loss_value = graph.value(loss)?;
        graph.backward(loss)?;
        optimizer.step(graph)?;
        Ok(loss_value)
    });
    let cleared = optimizer.zero_grad(graph);
    graph.rewind(mark);
    let loss_value = result?;
    cleared?;
    Ok(loss_value)
}

/// Runs `iterations` steps and returns the loss recorded at each of them.
pub fn train(
    graph: &mut Graph,
    mlp: &Mlp,
    optimizer: &mut Sgd,
    iterations: usize,
) -> Result<Vec<f64>, MicrogradError> {
    let mut history = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let loss = train_step(graph, mlp, optimizer, &TRAIN_INPUTS, &TRAIN_TARGETS)?;
        debug!("iteration {}: loss {}", i + 1, loss);
        if i == 0 || (i + 1) % 10 == 0 || i + 1 == iterations {
            info!("Iteration {:>4}: loss {:.6}", i + 1, loss);
        }
        history.push(loss);
    }
    Ok(history)
}

/// Evaluates the network on a single input without keeping any nodes.
pub fn predict(graph: &mut Graph, mlp: &Mlp, x: f64) -> Result<f64, MicrogradError> {
    let mark = graph.checkpoint();
    let result = mlp
        .forward_values(graph, &[x])
        .and_then(|out| match out.first() {
            Some(&node) => graph.value(node),
            None => Err(MicrogradError::ArityMismatch {
                expected: 1,
                actual: 0,
                operation: "predict".to_string(),
            }),
        });
    graph.rewind(mark);
    result
}

/// Class label the network is expected to reproduce for a scaled input.
pub fn expected_class(x: f64) -> &'static str {
    if x * 100.0 > 50.0 {
        "> 50"
    } else {
        "<= 50"
    }
}

/// Renders the loss graph of the current parameters, gradients included.
pub fn render_loss_graph(graph: &mut Graph, mlp: &Mlp) -> Result<String, MicrogradError> {
    let mark = graph.checkpoint();
    let result = build_loss(graph, mlp, &TRAIN_INPUTS, &TRAIN_TARGETS).and_then(|loss| {
        graph.backward(loss)?;
        graph.render_tree(loss)
    });
    graph.zero_all_grads();
    graph.rewind(mark);
    result
}

#[cfg(test)]
#[path = "train_test.rs"]
mod tests;
