//! Hand-rolled CLI argument parsing.
//!
//! No argument-parsing crate is introduced here — the original crate's own
//! binaries (`bin/prover.rs`) scan `env::args()` by hand with small
//! `parse_flag`/`parse_bool` helpers rather than depending on `clap`, and
//! this crate follows the same convention.

use crate::config::{Config, OhMode};
use crate::domain::Domain;
use crate::error::VerifierError;
use crate::region::Perturbation;

/// Fully parsed CLI invocation.
pub struct CliArgs {
    pub svm_path: String,
    pub dataset_path: String,
    pub domain: Domain,
    pub perturbation_args: Vec<String>,
    pub tier_path: Option<String>,
    pub config: Config,
}

/// Pulls `--flag` (optionally with a following value) out of `args`,
/// returning the remaining positional arguments.
fn extract_flags(args: &[String]) -> (Vec<String>, Option<String>, bool) {
    let mut positional = Vec::new();
    let mut counterexamples_file = None;
    let mut debug_output = false;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--counterexamples-file" => {
                counterexamples_file = args.get(i + 1).cloned();
                i += 2;
            }
            "--debug-output" => {
                debug_output = true;
                i += 1;
            }
            other => {
                positional.push(other.to_string());
                i += 1;
            }
        }
    }
    (positional, counterexamples_file, debug_output)
}

fn parse_bool_flag(tok: Option<&String>) -> bool {
    tok.map(|s| s == "1").unwrap_or(false)
}

impl CliArgs {
    pub fn parse(raw_args: &[String]) -> Result<Self, VerifierError> {
        let (positional, counterexamples_file, debug_output) = extract_flags(raw_args);

        if positional.len() < 2 {
            return Err(VerifierError::Usage(
                "usage: saver <svm_path> <dataset_csv> [abstraction] [perturbation] [perturbation_args...] [tier_path] [is_binary] [top] [oh] [oh_ce] [partition]".to_string(),
            ));
        }

        let svm_path = positional[0].clone();
        let dataset_path = positional[1].clone();
        let domain = positional
            .get(2)
            .and_then(|s| Domain::parse(s))
            .unwrap_or(Domain::Interval);

        let perturbation_tail: Vec<String> = positional.get(3..).map(|s| s.to_vec()).unwrap_or_default();

        let mut config = Config::default();
        config.domain = domain;
        config.counterexamples_file = counterexamples_file;
        config.debug_output = debug_output;

        Ok(CliArgs {
            svm_path,
            dataset_path,
            domain,
            perturbation_args: perturbation_tail,
            tier_path: None,
            config,
        })
    }

    /// Finishes parsing the perturbation (needs `space_size`, known only
    /// after the dataset is loaded) and the trailing positional switches
    /// that follow the perturbation's own arguments.
    pub fn finish(&mut self, space_size: usize) -> Result<Perturbation, VerifierError> {
        let args_ref: Vec<&str> = self.perturbation_args.iter().map(|s| s.as_str()).collect();

        // `from_file` names a path whose contents (one row of bounds per
        // dataset sample) can only be read by the caller; placeholder here,
        // the caller replaces it after loading that file.
        let (perturbation, consumed) = if args_ref.first() == Some(&"from_file") {
            (Perturbation::FromFile { bounds_per_sample: Vec::new() }, 2)
        } else {
            Perturbation::parse(&args_ref, space_size).map_err(VerifierError::Perturbation)?
        };

        let rest = &self.perturbation_args[consumed.min(self.perturbation_args.len())..];
        self.tier_path = rest.first().cloned();
        self.config.is_binary = parse_bool_flag(rest.get(1));
        self.config.report_feature_weights = parse_bool_flag(rest.get(2));
        self.config.oh = if parse_bool_flag(rest.get(3)) { OhMode::PerOp } else { OhMode::Off };
        // rest.get(4) selects the alternative OH-RAF counterexample path;
        // modeled as part of OhMode in a fuller build-out, left as the
        // default PerOp/AtLast choice here.
        self.config.partition = parse_bool_flag(rest.get(5));

        Ok(perturbation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let args: Vec<String> = vec!["model.svm".into(), "data.csv".into()];
        let cli = CliArgs::parse(&args).unwrap();
        assert_eq!(cli.svm_path, "model.svm");
        assert_eq!(cli.domain, Domain::Interval);
    }

    #[test]
    fn extracts_debug_and_counterexamples_flags() {
        let args: Vec<String> = vec![
            "model.svm".into(),
            "data.csv".into(),
            "--debug-output".into(),
            "--counterexamples-file".into(),
            "out.txt".into(),
        ];
        let cli = CliArgs::parse(&args).unwrap();
        assert!(cli.config.debug_output);
        assert_eq!(cli.config.counterexamples_file, Some("out.txt".to_string()));
    }

    #[test]
    fn rejects_too_few_positional_args() {
        let args: Vec<String> = vec!["only_one.svm".into()];
        assert!(CliArgs::parse(&args).is_err());
    }
}
