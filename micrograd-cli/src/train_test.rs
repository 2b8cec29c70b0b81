use super::*;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::tempdir;

fn fresh_model(graph: &mut Graph, seed: u64) -> Result<Mlp, MicrogradError> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mlp::new(graph, NUM_INPUTS, &[3, 4, 4, 1], &mut rng)
}

#[test]
fn test_expected_class() {
    assert_eq!(expected_class(0.6), "> 50");
    assert_eq!(expected_class(0.9), "> 50");
    assert_eq!(expected_class(0.5), "<= 50");
    assert_eq!(expected_class(0.1), "<= 50");
}

#[test]
fn test_train_step_keeps_only_parameters() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 3)?;
    let mut sgd = Sgd::new(mlp.parameters(), 0.01)?;
    let before = graph.len();

    train_step(&mut graph, &mlp, &mut sgd, &TRAIN_INPUTS, &TRAIN_TARGETS)?;
    assert_eq!(graph.len(), before);
    for p in mlp.parameters() {
        assert_eq!(graph.grad(p)?, 0.0);
    }
    Ok(())
}

#[test]
fn test_failed_train_step_leaves_graph_clean() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 3)?;
    let mut sgd = Sgd::new(mlp.parameters(), 0.01)?;
    let before = graph.len();
    let values = mlp.state(&graph)?;

    // Fewer targets than inputs: the loss fails after the forward pass.
    let result = train_step(&mut graph, &mlp, &mut sgd, &TRAIN_INPUTS, &TRAIN_TARGETS[..3]);
    assert!(matches!(result, Err(MicrogradError::ArityMismatch { .. })));
    assert_eq!(graph.len(), before);
    assert_eq!(mlp.state(&graph)?, values);

    // The next iteration runs normally on the same graph.
    train_step(&mut graph, &mlp, &mut sgd, &TRAIN_INPUTS, &TRAIN_TARGETS)?;
    assert_eq!(graph.len(), before);
    Ok(())
}

#[test]
fn test_train_step_reports_loss_before_update() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 5)?;
    let mut sgd = Sgd::new(mlp.parameters(), 0.01)?;

    let mark = graph.checkpoint();
    let loss = build_loss(&mut graph, &mlp, &TRAIN_INPUTS, &TRAIN_TARGETS)?;
    let expected = graph.value(loss)?;
    graph.rewind(mark);

    let reported = train_step(&mut graph, &mlp, &mut sgd, &TRAIN_INPUTS, &TRAIN_TARGETS)?;
    assert_relative_eq!(reported, expected);
    Ok(())
}

#[test]
fn test_training_reduces_loss() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 42)?;
    let mut sgd = Sgd::new(mlp.parameters(), 0.01)?;

    let history = train(&mut graph, &mlp, &mut sgd, 100)?;
    assert_eq!(history.len(), 100);
    assert!(history[99] < history[0], "loss went from {} to {}", history[0], history[99]);
    Ok(())
}

#[test]
fn test_predict_does_not_grow_graph() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 1)?;
    let before = graph.len();
    let y = predict(&mut graph, &mlp, 0.6)?;
    assert!(y > -1.0 && y < 1.0);
    assert_eq!(graph.len(), before);
    Ok(())
}

#[test]
fn test_render_loss_graph() -> Result<(), MicrogradError> {
    let mut graph = Graph::new();
    let mlp = fresh_model(&mut graph, 1)?;
    let before = graph.len();

    let tree = render_loss_graph(&mut graph, &mlp)?;
    assert!(tree.starts_with("└── Value(loss: "));
    assert!(tree.contains("layer0.neuron0.w0"));
    assert!(tree.contains("(tanh)"));
    assert_eq!(graph.len(), before);
    for p in mlp.parameters() {
        assert_eq!(graph.grad(p)?, 0.0);
    }
    Ok(())
}

#[test]
fn test_load_or_create_without_file_builds_fresh_model() -> Result<(), MicrogradError> {
    let dir = tempdir().map_err(|e| MicrogradError::Io {
        path: "tempdir".to_string(),
        reason: e.to_string(),
    })?;
    let path = dir.path().join("model.json");
    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(0);

    let mlp = load_or_create(&mut graph, &path, false, &[2, 1], &mut rng)?;
    assert_eq!(mlp.layer_sizes(), vec![2, 1]);
    assert_eq!(mlp.num_inputs(), NUM_INPUTS);
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_load_or_create_restores_saved_model() -> Result<(), MicrogradError> {
    let dir = tempdir().map_err(|e| MicrogradError::Io {
        path: "tempdir".to_string(),
        reason: e.to_string(),
    })?;
    let path = dir.path().join("model.json");

    let mut graph = Graph::new();
    let saved = fresh_model(&mut graph, 11)?;
    let state = saved.state(&graph)?;
    model::save(&path, &state)?;

    let mut other_graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(99);
    let loaded = load_or_create(&mut other_graph, &path, false, &[2, 1], &mut rng)?;
    assert_eq!(loaded.state(&other_graph)?, state);

    // --fresh ignores the file and uses the requested layers
    let mut fresh_graph = Graph::new();
    let fresh = load_or_create(&mut fresh_graph, &path, true, &[2, 1], &mut rng)?;
    assert_eq!(fresh.layer_sizes(), vec![2, 1]);
    Ok(())
}

#[test]
fn test_load_or_create_falls_back_on_corrupt_file() -> Result<(), MicrogradError> {
    let dir = tempdir().map_err(|e| MicrogradError::Io {
        path: "tempdir".to_string(),
        reason: e.to_string(),
    })?;
    let path = dir.path().join("model.json");
    fs::write(&path, "{ not json").map_err(|e| MicrogradError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mlp = load_or_create(&mut graph, &path, false, &[3, 1], &mut rng)?;
    assert_eq!(mlp.layer_sizes(), vec![3, 1]);
    assert_eq!(graph.len(), mlp.num_parameters());
    Ok(())
}

#[test]
fn test_load_or_create_rejects_multi_output_layers() {
    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(0);
    let path = Path::new("does-not-matter.json");
    let result = load_or_create(&mut graph, path, true, &[3, 2], &mut rng);
    assert!(matches!(result, Err(MicrogradError::InvalidConfig(_))));
}
