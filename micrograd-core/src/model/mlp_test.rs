use super::*;
use crate::autograd::check_grad;
use crate::nn::losses::SquaredErrorLoss;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn expected_parameter_count(num_inputs: usize, layer_sizes: &[usize]) -> usize {
    let mut nin = num_inputs;
    let mut total = 0;
    for &size in layer_sizes {
        total += (nin + 1) * size;
        nin = size;
    }
    total
}

#[test]
fn test_parameter_count_matches_architecture() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(0);
    for (nin, sizes) in [
        (1, vec![3, 4, 4, 1]),
        (3, vec![4, 4, 1]),
        (2, vec![1]),
        (0, vec![2, 2]),
        (5, vec![7]),
    ] {
        let mut graph = Graph::new();
        let mlp = Mlp::new(&mut graph, nin, &sizes, &mut rng)?;
        assert_eq!(mlp.parameters().len(), expected_parameter_count(nin, &sizes));
        assert_eq!(graph.len(), mlp.num_parameters());
        assert_eq!(mlp.layer_sizes(), sizes);
        assert_eq!(mlp.num_inputs(), nin);
        assert_eq!(mlp.num_outputs(), *sizes.last().unwrap());
    }
    Ok(())
}

#[test]
fn test_layers_chain_arity() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 3, &[4, 2, 1], &mut rng)?;
    let nins: Vec<usize> = mlp.layers().iter().map(|l| l.nin()).collect();
    assert_eq!(nins, vec![3, 4, 2]);
    Ok(())
}

#[test]
fn test_forward_returns_last_layer_outputs() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 2, &[3, 2], &mut rng)?;
    let outputs = mlp.forward_values(&mut graph, &[0.5, -1.0])?;
    assert_eq!(outputs.len(), 2);
    for out in outputs {
        let v = graph.value(out)?;
        assert!(v > -1.0 && v < 1.0);
    }
    Ok(())
}

#[test]
fn test_forward_matches_layer_by_layer_evaluation() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(2);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 2, &[3, 1], &mut rng)?;
    let x: Vec<NodeId> = [0.2, 0.9].iter().map(|&v| graph.leaf(v)).collect();

    let out = mlp.forward(&mut graph, &x)?;
    let hidden = mlp.layers()[0].forward(&mut graph, &x)?;
    let manual = mlp.layers()[1].forward(&mut graph, &hidden)?;
    assert_eq!(graph.value(out[0])?, graph.value(manual[0])?);
    Ok(())
}

#[test]
fn test_forward_rejects_wrong_input_length() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 2, &[3, 1], &mut rng)?;
    let result = mlp.forward_values(&mut graph, &[1.0]);
    assert_eq!(
        result,
        Err(MicrogradError::ArityMismatch {
            expected: 2,
            actual: 1,
            operation: "Mlp::forward".to_string()
        })
    );
    Ok(())
}

#[test]
fn test_invalid_architectures() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut graph = Graph::new();
    assert!(matches!(
        Mlp::new(&mut graph, 2, &[], &mut rng),
        Err(MicrogradError::InvalidConfig(_))
    ));
    assert!(matches!(
        Mlp::new(&mut graph, 2, &[3, 0, 1], &mut rng),
        Err(MicrogradError::InvalidConfig(_))
    ));
    assert!(graph.is_empty());
}

#[test]
fn test_same_seed_same_network() -> Result<(), MicrogradError> {
    let build = |seed| -> Result<MlpState, MicrogradError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = Graph::new();
        let mlp = Mlp::new(&mut graph, 2, &[3, 1], &mut rng)?;
        mlp.state(&graph)
    };
    assert_eq!(build(9)?, build(9)?);
    assert_ne!(build(9)?, build(10)?);
    Ok(())
}

#[test]
fn test_named_parameters_follow_parameter_order() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(4);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 1, &[2, 1], &mut rng)?;
    let named = mlp.named_parameters();
    let ids: Vec<NodeId> = named.iter().map(|(_, id)| *id).collect();
    assert_eq!(ids, mlp.parameters());
    assert_eq!(named[0].0, "layer0.neuron0.w0");
    assert_eq!(named[4].0, "layer1.neuron0.w0");
    assert_eq!(named.last().map(|(n, _)| n.as_str()), Some("layer1.neuron0.b"));
    Ok(())
}

#[test]
fn test_state_round_trip_is_bit_exact() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(21);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 2, &[4, 3, 1], &mut rng)?;

    // Move every parameter away from its initial draw.
    for (i, p) in mlp.parameters().into_iter().enumerate() {
        let v = graph.value(p)?;
        graph.set_value(p, v * 0.5 + (i as f64) * 1e-3)?;
    }

    let json = mlp.state(&graph)?.to_json()?;
    let mut restored_graph = Graph::new();
    let restored = Mlp::from_state(&mut restored_graph, &MlpState::from_json(&json)?)?;

    for input in [[0.3, -0.7], [1.0, 1.0], [-0.25, 0.0]] {
        let a = mlp.forward_values(&mut graph, &input)?;
        let b = restored.forward_values(&mut restored_graph, &input)?;
        assert_eq!(graph.value(a[0])?.to_bits(), restored_graph.value(b[0])?.to_bits());
    }
    for p in restored.parameters() {
        assert_eq!(restored_graph.grad(p)?, 0.0);
    }
    Ok(())
}

#[test]
fn test_load_state_overwrites_in_parameter_order() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(5);
    let mut graph = Graph::new();
    let source = Mlp::new(&mut graph, 2, &[2, 1], &mut rng)?;
    let target = Mlp::new(&mut graph, 2, &[2, 1], &mut rng)?;
    assert_ne!(source.state(&graph)?, target.state(&graph)?);

    let state = source.state(&graph)?;
    target.load_state(&mut graph, &state)?;
    assert_eq!(target.state(&graph)?, state);

    let other = Mlp::new(&mut graph, 2, &[3, 1], &mut rng)?;
    assert!(matches!(
        other.load_state(&mut graph, &state),
        Err(MicrogradError::StateMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_from_state_rejects_inconsistent_state() {
    let mut graph = Graph::new();
    let state = MlpState {
        num_inputs: 2,
        layer_sizes: vec![1],
        layer_states: vec![vec![NeuronState { weights: vec![0.1], bias: 0.0 }]],
    };
    assert!(matches!(
        Mlp::from_state(&mut graph, &state),
        Err(MicrogradError::StateMismatch(_))
    ));
    assert!(graph.is_empty());
}

#[test]
fn test_mlp_loss_gradients_match_finite_differences() -> Result<(), MicrogradError> {
    let mut rng = StdRng::seed_from_u64(8);
    let mut graph = Graph::new();
    let mlp = Mlp::new(&mut graph, 2, &[3, 1], &mut rng)?;
    let params = mlp.parameters();

    let func = |g: &mut Graph, _params: &[NodeId]| {
        let mut outputs = Vec::new();
        for x in [[0.5, -0.2], [-0.9, 0.4]] {
            outputs.extend(mlp.forward_values(g, &x)?);
        }
        SquaredErrorLoss::default().calculate(g, &outputs, &[1.0, -1.0])
    };
    let result = check_grad(&mut graph, func, &params, 1e-6, 1e-5);
    assert!(result.is_ok(), "MLP grad check failed: {:?}", result.err());
    Ok(())
}
