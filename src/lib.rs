//! Crate root: public surface for a sound abstract-interpretation verifier
//! of one-versus-one multi-class SVM classifiers.
//!
//! This module is the single canonical entry point for downstream users of
//! the library. It re-exports the abstract domains (Interval, RAF, Hybrid,
//! one-hot-aware tier refinements), the OVO model/scorer/voter pipeline, and
//! the counterexample engine.
//!
//! ## Invariants
//!
//! - Every abstract operation over-approximates: for any concrete value in
//!   the input region, the corresponding abstract value is contained in the
//!   computed abstract result. `unsafe` is forbidden throughout.
//! - Interval bounds are produced via outward-rounded arithmetic (see
//!   [`interval::outward`]), since safe Rust has no portable per-operation
//!   FP rounding-mode control.
//! - A possible-winners set returned by [`voter::possible_winners`] is
//!   always a superset of the concrete winners realizable within the
//!   abstracted region; a singleton result proves robustness.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// CLI argument parsing.
pub mod cli;
/// Run configuration (domain choice, one-hot mode, partition toggle, ...).
pub mod config;
/// Counterexample engine: vertex heuristic, OH-RAF vertex exhibition,
/// partition-and-rerun, divide-et-impera.
pub mod counterexample;
/// CSV dataset loading.
pub mod dataset;
/// Tagged abstract-domain dispatch and the Interval/RAF hybrid meet.
pub mod domain;
/// Error taxonomy.
pub mod error;
/// Sound interval arithmetic.
pub mod interval;
/// SVM kernel functions (linear, RBF, polynomial) and their abstract lifts.
pub mod kernel;
/// SVM model file parsing and concrete/abstract OVO scoring.
pub mod model;
/// One-hot-aware refinements of Interval and RAF.
pub mod onehot;
/// Reduced Affine Forms with shared noise symbols.
pub mod raf;
/// Adversarial regions and perturbation kinds.
pub mod region;
/// Output formatting (per-sample rows, summary line).
pub mod report;
/// OVO abstract scorer.
pub mod scorer;
/// Elapsed-time measurement.
pub mod stopwatch;
/// Tier metadata for one-hot-encoded categorical features.
pub mod tier;
/// OVO abstract voter.
pub mod voter;

pub use config::{Config, OhMode};
pub use domain::Domain;
pub use error::VerifierError;
pub use model::Model;
pub use region::Perturbation;
