//! End-to-end scenarios run through the public API surface, as opposed to
//! the inline per-module unit tests exercising a single collaborator.

use saver::counterexample::{divide_et_impera, vertex_heuristic_search, Verdict};
use saver::domain::{lift_input, score};
use saver::interval::Interval;
use saver::kernel::Kernel;
use saver::model::Model;
use saver::tier::{Origin, Tier};
use saver::voter::{possible_winners, vote_intervals};
use saver::Domain;

fn linear_2class_model() -> Model {
    let text = "ovo 2 2\nlinear\nclassA 1\nclassB 1\n1.0\n1.0 0.0\n0.0 0.0\n0.0\n";
    Model::parse(text).unwrap()
}

#[test]
fn scenario_1_linear_robust_end_to_end() {
    let model = linear_2class_model();
    let bounds = [(0.1, 0.5), (0.3, 0.7)];
    let (intervals, rafs) = lift_input(&bounds);
    let trivial = Tier::trivial(2);
    let origins = vec![Origin::Ambiguous; 2];
    let scores = score(Domain::Interval, &model, &intervals, &rafs, &trivial, &origins);
    assert_eq!(scores[0], Interval::new(0.1, 0.5));
    let votes = vote_intervals(model.n_classes(), &scores);
    assert_eq!(possible_winners(&votes), vec![0]);
}

#[test]
fn scenario_2_not_robust_with_counterexample() {
    let model = linear_2class_model();
    let sample = [0.3, 0.5];
    let bounds = [(-0.2, 0.8), (0.0, 1.0)];
    let (intervals, rafs) = lift_input(&bounds);
    let trivial = Tier::trivial(2);
    let origins = vec![Origin::Ambiguous; 2];
    let scores = score(Domain::Interval, &model, &intervals, &rafs, &trivial, &origins);
    let votes = vote_intervals(model.n_classes(), &scores);
    let winners = possible_winners(&votes);
    assert_eq!(winners, vec![0, 1]);

    let ce = vertex_heuristic_search(&model, &sample, &bounds, winners[0], winners[1]).unwrap();
    assert_eq!(ce.sample_l, vec![-0.2, 0.5]);
    assert_eq!(ce.sample_u, vec![0.8, 0.5]);
    assert_ne!(model.classify(&ce.sample_l), model.classify(&ce.sample_u));
}

#[test]
fn scenario_3_rbf_single_sv_end_to_end() {
    let text = "ovo 2 2\nrbf 1.0\nclassA 1\nclassB 0\n1.0\n0.0 0.0\n0.0\n";
    let model = Model::parse(text).unwrap();
    assert!(matches!(model.kernel, Kernel::Rbf { gamma } if gamma == 1.0));

    let bounds = [(0.05, 0.15), (0.05, 0.15)];
    let (intervals, rafs) = lift_input(&bounds);
    let trivial = Tier::trivial(2);
    let origins = vec![Origin::Ambiguous; 2];
    let scores = score(Domain::Raf, &model, &intervals, &rafs, &trivial, &origins);
    assert!(scores[0].l > 0.0, "RBF score must stay positive over this tight region: {:?}", scores[0]);
    let votes = vote_intervals(model.n_classes(), &scores);
    assert_eq!(possible_winners(&votes), vec![0]);
}

#[test]
fn scenario_5_partition_and_rerun_end_to_end() {
    use saver::counterexample::partition_and_rerun;

    let rescore = |bounds: &[(f64, f64)]| {
        let (l0, u0) = bounds[0];
        let (l1, u1) = bounds[1];
        let c0 = 0.5 * (l0 + u0);
        let h0 = 0.5 * (u0 - l0);
        let c1 = 0.5 * (l1 + u1);
        let h1 = 0.5 * (u1 - l1);
        let center = 0.7 * c0 + 0.3 * c1;
        let radius = 0.7_f64.abs() * h0 + 0.3_f64.abs() * h1;
        (Interval::new(center - radius, center + radius), vec![0.7 * h0, 0.3 * h1], None)
    };
    let bounds = [(-1.0, 1.0), (-1.0, 1.0)];
    let skip = [false, false];
    let (reg, has_counter_region) = partition_and_rerun(&bounds, &skip, 100.0, 6.0, &rescore);
    assert!((reg.neg - 50.0).abs() < 1e-9);
    assert!((reg.pos - 50.0).abs() < 1e-9);
    assert!(has_counter_region);
}

#[test]
fn scenario_6_divide_et_impera_finds_shell_counterexample() {
    // Linear SVM with a decision boundary at x0 = 0.15, so the shrunk core
    // around (0.2, 0.2) is robust but the outer shell at x0's lower edge
    // crosses the boundary.
    let text = "ovo 2 2\nlinear\nclassA 1\nclassB 1\n1.0\n1.0 0.0\n0.0 0.0\n-0.15\n";
    let model = Model::parse(text).unwrap();
    let sample = [0.2, 0.2];
    let bounds = [(-0.2, 0.6), (-0.2, 0.6)];

    let classify_abstract = |b: &[(f64, f64)]| -> Vec<usize> {
        let (intervals, rafs) = lift_input(b);
        let trivial = Tier::trivial(b.len());
        let origins = vec![Origin::Ambiguous; b.len()];
        let scores = score(Domain::Interval, &model, &intervals, &rafs, &trivial, &origins);
        let votes = vote_intervals(model.n_classes(), &scores);
        possible_winners(&votes)
    };

    let verdict = divide_et_impera(&model, &sample, &bounds, &classify_abstract);
    assert_ne!(verdict, Verdict::Robust);
}
