//! Rule-Based Fallback System
//!
//! Provides a heuristic classifier when the sequence model is unavailable.

mod rules;

pub use rules::{HeuristicClassifier, HeuristicRules};
