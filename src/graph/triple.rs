// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use serde::{Deserialize, Serialize};

/// An ordered triple `(x, y, z)` recording a judgment at `y` about the path `x - y - z`.
///
/// Triples are stored with `x <= z` so that `(x, y, z)` and `(z, y, x)` name the same
/// judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Triple {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        if x <= z {
            Self { x, y, z }
        } else {
            Self { x: z, y, z: x }
        }
    }
}

/// Outcome of classifying an unshielded triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripleType {
    Collider,
    NonCollider,
    Ambiguous,
}
