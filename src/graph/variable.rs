// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Named, typed variables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement scale of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Continuous,
    Discrete,
}

/// A variable: an identifier plus its type tag. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Continuous)
    }

    pub fn discrete(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Discrete)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn is_discrete(&self) -> bool {
        self.kind == VariableKind::Discrete
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Build continuous variables from a list of names.
pub fn continuous_variables<S: AsRef<str>>(names: &[S]) -> Vec<Variable> {
    names
        .iter()
        .map(|n| Variable::continuous(n.as_ref()))
        .collect()
}
