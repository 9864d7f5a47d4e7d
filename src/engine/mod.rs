// The safety-constrained workout compiler core: rule tables, the
// evaluator, the parameter merge algebra, day templates, the checkpoint
// timeline and the in-session binder-break timer. Everything here is pure
// and synchronous; I/O lives in the services layer.

pub mod evaluator;
pub mod merge;
pub mod rules;
pub mod templates;
pub mod timeline;
pub mod timer;

pub use evaluator::{current_recovery_phase, EvaluationContext, RulesEngine};
pub use merge::merge;
