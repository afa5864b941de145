//! Lifecycle rules: the transition table and the validator that applies
//! it to concrete orders and actors.

pub mod transitions;
pub mod validator;

pub use transitions::{available_rule, rule_for, rules, valid_actions, ActionRule};
pub use validator::{AcceptedTransition, TransitionEffects, TransitionError, TransitionValidator};
