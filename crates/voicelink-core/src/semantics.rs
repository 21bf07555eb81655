//! Semantic annotation accumulation.
//!
//! Enumerated and range property kinds can declare which natural-language
//! actions and states map onto which directives and values. The builder
//! coalesces records targeting the same outcome so the serialized semantics
//! block lists each directive or value once, with every identifier attached.

use serde::Serialize;
use serde_json::Value;

/// A directive invocation with payload, as referenced by an action mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl DirectiveSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// External action identifiers mapped to one directive invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMapping {
    pub actions: Vec<String>,
    pub directive: DirectiveSpec,
}

/// What a state mapping resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum StateTarget {
    Value { value: Value },
    Range { range: StateRange },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRange {
    pub minimum: f64,
    pub maximum: f64,
}

/// External state identifiers mapped to one literal value or numeric range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMapping {
    pub states: Vec<String>,
    #[serde(flatten)]
    pub target: StateTarget,
}

/// Accumulated semantics block, omitted entirely when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Semantics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub action_mappings: Vec<ActionMapping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state_mappings: Vec<StateMapping>,
}

/// Accumulates action and state mappings, deduplicating by target.
#[derive(Debug, Default)]
pub struct SemanticsBuilder {
    actions: Vec<ActionMapping>,
    states: Vec<StateMapping>,
}

impl SemanticsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate an action identifier with a directive. Records sharing a
    /// structurally equal directive are merged into one.
    pub fn add_action(&mut self, action: impl Into<String>, directive: DirectiveSpec) {
        let action = action.into();
        if let Some(existing) = self.actions.iter_mut().find(|m| m.directive == directive) {
            if !existing.actions.contains(&action) {
                existing.actions.push(action);
            }
        } else {
            self.actions.push(ActionMapping {
                actions: vec![action],
                directive,
            });
        }
    }

    /// Associate a state identifier with a literal value.
    pub fn add_state_value(&mut self, state: impl Into<String>, value: Value) {
        self.add_state(state.into(), StateTarget::Value { value });
    }

    /// Associate a state identifier with a numeric range.
    pub fn add_state_range(&mut self, state: impl Into<String>, minimum: f64, maximum: f64) {
        self.add_state(
            state.into(),
            StateTarget::Range {
                range: StateRange { minimum, maximum },
            },
        );
    }

    fn add_state(&mut self, state: String, target: StateTarget) {
        if let Some(existing) = self.states.iter_mut().find(|m| m.target == target) {
            if !existing.states.contains(&state) {
                existing.states.push(state);
            }
        } else {
            self.states.push(StateMapping {
                states: vec![state],
                target,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.states.is_empty()
    }

    /// Finish accumulation. Returns `None` when nothing was recorded so the
    /// semantics block can be omitted from serialized output.
    pub fn build(self) -> Option<Semantics> {
        if self.is_empty() {
            return None;
        }
        Some(Semantics {
            action_mappings: self.actions,
            state_mappings: self.states,
        })
    }
}
