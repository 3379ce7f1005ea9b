//! Soundly verifies a one-versus-one SVM classifier's robustness against an
//! adversarial perturbation region, per-sample, over a dataset.
//!
//! Usage:
//!   saver <svm_path> <dataset_csv> [abstraction] [perturbation] [perturbation_args...]
//!         [tier_path] [is_binary 0|1] [top 0|1] [oh 0|1] [oh_ce 0|1] [partition 0|1]
//!         [--counterexamples-file PATH] [--debug-output]

#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::io::{self, Write};

use saver::config::OhMode;
use saver::counterexample::{divide_et_impera, partition_and_rerun, vertex_heuristic_search, Counterexample, Verdict};
use saver::dataset::Dataset;
use saver::domain::{lift_input, score};
use saver::model::{pair_index, Model};
use saver::onehot::tier_origins;
use saver::region::{AdversarialRegion, Perturbation};
use saver::report::{SampleRow, Summary};
use saver::scorer::score_raf;
use saver::stopwatch::Stopwatch;
use saver::tier::{Origin, Tier};
use saver::voter::{possible_winners, vote_intervals};
use saver::{cli::CliArgs, Domain, VerifierError};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), VerifierError> {
    let raw_args: Vec<String> = env::args().skip(1).collect();
    let mut cli = CliArgs::parse(&raw_args)?;

    let svm_text = fs::read_to_string(&cli.svm_path).map_err(saver::error::ModelError::Io)?;
    let model = Model::parse(&svm_text)?;

    let dataset_text = fs::read_to_string(&cli.dataset_path).map_err(saver::error::DatasetError::Io)?;
    let dataset = Dataset::parse(&dataset_text)?;

    if dataset.space_size != model.space_size {
        return Err(VerifierError::Usage(format!(
            "dataset space size {} does not match model space size {}",
            dataset.space_size, model.space_size
        )));
    }

    let perturbation = cli.finish(dataset.space_size)?;
    let perturbation = if let Perturbation::FromFile { .. } = &perturbation {
        let path = cli
            .perturbation_args
            .get(1)
            .ok_or_else(|| VerifierError::Usage("from_file perturbation requires a path".to_string()))?;
        let text = fs::read_to_string(path).map_err(saver::error::PerturbationError::Io)?;
        saver::region::parse_from_file(&text, dataset.space_size).map_err(VerifierError::Perturbation)?
    } else {
        perturbation
    };

    let tier = match &cli.tier_path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(saver::error::TierError::Io)?;
            Tier::parse(&text, dataset.space_size)?
        }
        None => Tier::trivial(dataset.space_size),
    };

    let config = &cli.config;

    // `config.oh` only refines `Interval`/`Raf` into their tier-aware
    // counterparts; an explicit `Hybrid`/`OhInterval`/`OhRaf` choice on the
    // command line always wins.
    let effective_domain = match (config.domain, config.oh) {
        (Domain::Interval, OhMode::Off) => Domain::Interval,
        (Domain::Raf, OhMode::Off) => Domain::Raf,
        (Domain::Interval, _) => Domain::OhInterval,
        (Domain::Raf, _) => Domain::OhRaf,
        (other, _) => other,
    };

    if config.debug_output {
        let dump = serde_json::to_string_pretty(config)
            .map_err(|e| VerifierError::Allocation(e.to_string()))?;
        tracing::debug!(effective_domain = ?effective_domain, config = %dump, "run configuration");
    }

    let mut stopwatch = Stopwatch::new();
    stopwatch.start();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut correct = 0usize;
    let mut robust = 0usize;
    let mut conditionally_robust = 0usize;
    let mut counterexamples_found = 0usize;
    let mut true_positive = 0usize;
    let mut true_negative = 0usize;
    let mut actual_positive = 0usize;
    let mut actual_negative = 0usize;
    let mut counterexample_lines: Vec<String> = Vec::new();

    for i in 0..dataset.size() {
        let sample = dataset.row(i);
        let true_label = dataset.label(i);

        let concrete_labels = model.classify(sample);
        if concrete_labels.iter().any(|c| c == true_label) {
            correct += 1;
        }

        if config.is_binary {
            let predicted_positive = concrete_labels.iter().any(|c| c == &model.classes[0]);
            let actually_positive = true_label == model.classes[0];
            if actually_positive {
                actual_positive += 1;
                if predicted_positive {
                    true_positive += 1;
                }
            } else {
                actual_negative += 1;
                if !predicted_positive {
                    true_negative += 1;
                }
            }
        }

        let region = AdversarialRegion { sample, perturbation: &perturbation, row_index: i };
        let bounds = region.bounds();

        let origins: Vec<Origin> = if effective_domain.is_one_hot_aware() {
            let mut origins = vec![Origin::Ambiguous; dataset.space_size];
            for (start, end) in tier.multi_coordinate_tiers() {
                for (k, o) in tier_origins(start, end, sample)?.into_iter().enumerate() {
                    origins[start + k] = o;
                }
            }
            origins
        } else {
            vec![Origin::Ambiguous; dataset.space_size]
        };

        let (intervals, rafs) = lift_input(&bounds);
        let scores = score(effective_domain, &model, &intervals, &rafs, &tier, &origins);
        let votes = vote_intervals(model.n_classes(), &scores);
        let winners = possible_winners(&votes);

        let abstract_labels: Vec<String> = winners.iter().map(|&k| model.classes[k].clone()).collect();

        let mut counterexample: Option<Counterexample> = None;
        let status: &str = if winners.len() <= 1 {
            robust += 1;
            "robust"
        } else {
            conditionally_robust += 1;
            let (target_i, target_j) = (winners[0], winners[1]);
            counterexample = vertex_heuristic_search(&model, sample, &bounds, target_i, target_j);

            let resolved = if counterexample.is_some() {
                "counterexample"
            } else if config.partition {
                // Escalate: shrink the region with partition-and-rerun first
                // (cheap, targets the straddling pair directly); if that
                // still can't rule out a sign flip, fall back to
                // divide-et-impera's shrunk-core-plus-shell analysis.
                let idx = pair_index(target_i, target_j, model.n_classes());
                let skip = tier.is_one_hot.clone();
                let rescore = |b: &[(f64, f64)]| {
                    let (_, rafs) = lift_input(b);
                    let r = score_raf(&model, &rafs)[idx].clone();
                    let interval = r.to_interval();
                    let ce = vertex_heuristic_search(&model, sample, b, target_i, target_j);
                    (interval, r.noise.clone(), ce)
                };
                let (_, has_counter_region) =
                    partition_and_rerun(&bounds, &skip, 100.0, config.min_partition_pct, &rescore);

                if !has_counter_region {
                    "robust"
                } else {
                    let classify_abstract = |b: &[(f64, f64)]| -> Vec<usize> {
                        let (intervals, rafs) = lift_input(b);
                        let scores = score(effective_domain, &model, &intervals, &rafs, &tier, &origins);
                        possible_winners(&vote_intervals(model.n_classes(), &scores))
                    };
                    match divide_et_impera(&model, sample, &bounds, &classify_abstract) {
                        Verdict::Counterexample => "counterexample",
                        Verdict::Robust => "robust",
                        Verdict::DontKnow => "unknown",
                    }
                }
            } else {
                "unknown"
            };

            if resolved == "counterexample" {
                counterexamples_found += 1;
            }
            resolved
        };

        if let Some(ce) = &counterexample {
            tracing::debug!(row = i, sample_l = ?ce.sample_l, sample_u = ?ce.sample_u, "counterexample found");
            counterexample_lines.push(format!(
                "{i}\tsample_l={:?}\tsample_u={:?}",
                ce.sample_l, ce.sample_u
            ));
        } else if status == "counterexample" {
            counterexample_lines.push(format!("{i}\tconfirmed via divide-et-impera shell probe, exact vertex not recovered"));
        }

        let row = SampleRow {
            classifier_path: &cli.svm_path,
            dataset_path: &cli.dataset_path,
            id: i,
            epsilon: perturbation.magnitude(),
            true_label,
            concrete_labels: &concrete_labels,
            abstract_labels: &abstract_labels,
            counterexample_status: Some(status),
        };
        row.write_to(&mut out).map_err(|e| VerifierError::Allocation(e.to_string()))?;
    }

    stopwatch.stop();

    let balanced_accuracy = if config.is_binary && actual_positive > 0 && actual_negative > 0 {
        Some(0.5 * (true_positive as f64 / actual_positive as f64 + true_negative as f64 / actual_negative as f64))
    } else {
        None
    };

    let summary = Summary {
        size: dataset.size(),
        epsilon: perturbation.magnitude(),
        avg_ms_per_sample: stopwatch.elapsed_milliseconds() / dataset.size().max(1) as f64,
        correct,
        robust,
        conditionally_robust,
        balanced_accuracy,
        counterexamples_found,
    };
    summary
        .write_to(&mut out)
        .map_err(|e| VerifierError::Allocation(e.to_string()))?;

    if let Some(path) = &config.counterexamples_file {
        let contents = counterexample_lines.join("\n");
        fs::write(path, contents).map_err(|e| VerifierError::Allocation(e.to_string()))?;
        tracing::info!(path, count = counterexample_lines.len(), "counterexamples written to file");
    }

    Ok(())
}
