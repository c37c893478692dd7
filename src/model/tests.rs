use crate::model::explicit::{load_dtmc, model_stem, parse_dtmc};
use crate::model::{Dtmc, DtmcBuilder, INIT_LABEL, ModelError};
use crate::storage::StateId;
use crate::test_utils::{collect_states, init_logger};
use crate::value::RationalFunction;
use num_bigint::BigInt;
use num_rational::BigRational;
use std::path::Path;

const LABELS: &str = "#DECLARATION\ninit goal\n#END\n0 init\n1 goal\n";

#[test]
fn parse_both_header_forms() {
    init_logger();
    let keyword_header = "dtmc\nSTATES 2\nTRANSITIONS 3\n0 0 0.25\n0 1 0.75\n1 1 1\n";
    let short_header = "// A comment.\n2 3\n\n0 0 0.25\n0 1 0.75\n1 1 1\n";
    for text in [keyword_header, short_header] {
        let model: Dtmc<f64> = parse_dtmc(text, LABELS, None, None).unwrap();
        assert_eq!(model.state_count(), 2);
        assert_eq!(model.transition_matrix().entry_count(), 3);
        let entry = model
            .transition_matrix()
            .get(StateId::new(0), StateId::new(1));
        assert_eq!(entry, Some(&0.75));
        assert_eq!(collect_states(model.initial_states()), vec![0]);
        assert_eq!(collect_states(model.states_with_label("goal").unwrap()), vec![1]);
        assert!(!model.has_rewards());
    }
}

#[test]
fn parse_exact_and_parametric_values() {
    let text = "2 3\n0 0 1/3\n0 1 2/3\n1 1 1\n";
    let model: Dtmc<BigRational> = parse_dtmc(text, LABELS, None, None).unwrap();
    let third = BigRational::new(BigInt::from(1), BigInt::from(3));
    assert_eq!(
        model.transition_matrix().get(StateId::new(0), StateId::new(0)),
        Some(&third)
    );

    let text = "2 3\n0 0 p\n0 1 1 - p\n1 1 1\n";
    let model: Dtmc<RationalFunction> = parse_dtmc(text, LABELS, None, None).unwrap();
    let value = model
        .transition_matrix()
        .get(StateId::new(0), StateId::new(1))
        .unwrap();
    assert_eq!(value, &"1-p".parse::<RationalFunction>().unwrap());
}

#[test]
fn parse_rewards() {
    let text = "2 3\n0 0 0.5\n0 1 0.5\n1 1 1\n";
    let state_rewards = "0 2\n0 1\n";
    let transition_rewards = "0 1 4\n";
    let model: Dtmc<f64> =
        parse_dtmc(text, LABELS, Some(state_rewards), Some(transition_rewards)).unwrap();
    assert!(model.has_rewards());
    assert_eq!(model.state_rewards(), Some([3.0, 0.0].as_slice()));
    let transition_rewards = model.transition_rewards().unwrap();
    assert_eq!(transition_rewards.get(StateId::new(0), StateId::new(1)), Some(&4.0));
    assert_eq!(transition_rewards.get(StateId::new(0), StateId::new(0)), None);
}

#[test]
fn parse_errors() {
    let parse =
        |transitions: &str, labels: &str| parse_dtmc::<f64>(transitions, labels, None, None);

    let result = parse("2 4\n0 1 1\n1 1 1\n", LABELS);
    assert!(matches!(result, Err(ModelError::Parse { line: 1, .. })));
    let result = parse("STATES 2\n0 1 1\n1 1 1\n", LABELS);
    assert!(matches!(result, Err(ModelError::Parse { line: 2, .. })));
    let result = parse("", LABELS);
    assert!(matches!(result, Err(ModelError::Parse { .. })));
    let result = parse("2 2\n0 1\n1 1 1\n", LABELS);
    assert!(matches!(result, Err(ModelError::Parse { line: 2, .. })));
    let result = parse("2 2\n0 1 x\n1 1 1\n", LABELS);
    assert!(matches!(result, Err(ModelError::Parse { line: 2, .. })));
    let result = parse("2 2\n0 2 1\n1 1 1\n", LABELS);
    assert!(matches!(
        result,
        Err(ModelError::StateOutOfRange {
            state: 2,
            state_count: 2
        })
    ));
    let result = parse("2 2\n0 1 0.5\n1 1 1\n", LABELS);
    assert!(matches!(result, Err(ModelError::NotStochastic { state: 0, .. })));

    let transitions = "2 2\n0 1 1\n1 1 1\n";
    let result = parse(transitions, "#DECLARATION\ninit\n#END\n0 init\n1 goal\n");
    assert!(matches!(result, Err(ModelError::UndeclaredLabel(label)) if label == "goal"));
    let result = parse(transitions, "init goal\n");
    assert!(matches!(result, Err(ModelError::Parse { line: 1, .. })));
    let result = parse(transitions, "#DECLARATION\ninit goal\n");
    assert!(matches!(result, Err(ModelError::Parse { .. })));
    let result = parse(transitions, "#DECLARATION\ninit goal\n#END\n1 goal\n");
    assert!(matches!(result, Err(ModelError::MissingInitialState)));
}

#[test]
fn parse_rejects_invalid_probabilities() {
    // Each row sums to one, only the entries are broken.
    for value in ["-0.5", "nan", "inf", "-inf"] {
        let text = format!("2 4\n0 0 {value}\n0 1 1.5\n1 1 1\n1 0 0\n");
        let result = parse_dtmc::<f64>(&text, LABELS, None, None);
        assert!(
            matches!(result, Err(ModelError::Parse { line: 2, .. })),
            "{value}: {result:?}"
        );
    }
    let result = parse_dtmc::<BigRational>("2 3\n0 0 -1/2\n0 1 3/2\n1 1 1\n", LABELS, None, None);
    assert!(matches!(result, Err(ModelError::Parse { line: 2, .. })));
    // Parametric values are only checked once they are constant.
    let text = "2 3\n0 0 p\n0 1 1-p\n1 1 1\n";
    assert!(parse_dtmc::<RationalFunction>(text, LABELS, None, None).is_ok());
    let text = "2 3\n0 0 -1/2\n0 1 3/2\n1 1 1\n";
    let result = parse_dtmc::<RationalFunction>(text, LABELS, None, None);
    assert!(matches!(result, Err(ModelError::Parse { line: 2, .. })));

    let mut builder = DtmcBuilder::<f64>::new(2);
    assert!(matches!(
        builder.add_transition(0, 1, f64::NAN),
        Err(ModelError::InvalidProbability {
            state: 0,
            successor: 1,
            ..
        })
    ));
    assert!(builder.add_transition(0, 1, -0.25).is_err());
    assert!(builder.add_transition(0, 1, 0.0).is_ok());
}

#[test]
fn load_model_files() {
    init_logger();
    let stem = model_stem(Path::new("./models/knuth_yao_die.tra"));
    let model: Dtmc<f64> = load_dtmc(&stem).unwrap();
    assert_eq!(model.state_count(), 13);
    assert_eq!(model.transition_matrix().entry_count(), 20);
    let done = collect_states(model.states_with_label("done").unwrap());
    assert_eq!(done, (7..13).collect::<Vec<_>>());
    assert!(model.has_label("deadlock"));
    assert!(model.states_with_label("deadlock").unwrap().is_empty());
    assert_eq!(model.state_rewards().map(|it| it.iter().sum::<f64>()), Some(7.0));
    assert!(model.transition_rewards().is_none());

    let missing = load_dtmc::<f64>(Path::new("./models/missing"));
    assert!(matches!(missing, Err(ModelError::Io { .. })));
}

#[test]
fn builder_validates_input() {
    let mut builder = DtmcBuilder::<f64>::new(3);
    assert_eq!(builder.state_count(), 3);
    assert!(matches!(
        builder.add_transition(0, 3, 1.0),
        Err(ModelError::StateOutOfRange { state: 3, .. })
    ));
    assert!(builder.add_initial_state(5).is_err());
    assert!(builder.add_label("goal", 7).is_err());
    assert!(matches!(
        builder.set_state_rewards(vec![1.0; 2]),
        Err(ModelError::RewardSizeMismatch {
            expected: 3,
            actual: 2
        })
    ));
    // The third state has no outgoing transitions.
    builder.add_transition(0, 1, 1.0).unwrap();
    builder.add_transition(1, 1, 1.0).unwrap();
    builder.add_initial_state(0).unwrap();
    assert!(matches!(
        builder.build(),
        Err(ModelError::NotStochastic { state: 2, .. })
    ));
}

#[test]
fn builder_tolerates_rounding() {
    let mut builder = DtmcBuilder::<f64>::new(2);
    builder.add_transition(0, 0, 0.1).unwrap();
    builder.add_transition(0, 1, 0.2).unwrap();
    builder.add_transition(0, 1, 0.7).unwrap();
    builder.add_transition(1, 1, 1.0 - 1e-9).unwrap();
    builder.add_label(INIT_LABEL, 0).unwrap();
    let model = builder.build().unwrap();
    assert_eq!(collect_states(model.initial_states()), vec![0]);
    assert_eq!(collect_states(model.states_with_label(INIT_LABEL).unwrap()), vec![0]);
    assert_eq!(model.labels().collect::<Vec<_>>(), vec![INIT_LABEL]);
}

#[test]
fn builder_accumulates_rewards() {
    let mut builder = DtmcBuilder::<f64>::new(2);
    builder.add_transition(0, 1, 1.0).unwrap();
    builder.add_transition(1, 1, 1.0).unwrap();
    builder.add_initial_state(1).unwrap();
    builder.add_state_reward(0, 1.5).unwrap();
    builder.add_state_reward(0, 1.5).unwrap();
    builder.add_transition_reward(0, 1, 2.0).unwrap();
    let model = builder.build().unwrap();
    assert_eq!(model.state_rewards(), Some([3.0, 0.0].as_slice()));
    // The init label always matches the initial states.
    assert_eq!(collect_states(model.states_with_label(INIT_LABEL).unwrap()), vec![1]);

    let backward = model.backward_transitions();
    assert_eq!(backward.get(StateId::new(1), StateId::new(0)), Some(&1.0));
    assert_eq!(model.graph().predecessors(StateId::new(1)).len(), 2);
}
