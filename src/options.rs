//! Agent configuration

use serde::{Deserialize, Serialize};

use crate::error::JsResult;

/// Default allocations between automatic collections
pub const DEFAULT_GC_THRESHOLD: usize = 1024;

/// Default limit on nested execution contexts
pub const DEFAULT_MAX_EXECUTION_CONTEXT_DEPTH: usize = 512;

/// Options fixed at agent creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentOptions {
    /// Allocations between automatic collections at safe points (0 = never)
    pub gc_threshold: usize,
    /// Nested calls beyond this throw a RangeError
    pub max_execution_context_depth: usize,
    /// Whether new realms get `globalThis`, `Object`, `Symbol`, ... on their
    /// global object
    pub install_global_bindings: bool,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            max_execution_context_depth: DEFAULT_MAX_EXECUTION_CONTEXT_DEPTH,
            install_global_bindings: true,
        }
    }
}

impl AgentOptions {
    /// Parse options from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> JsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }

    pub fn with_max_execution_context_depth(mut self, depth: usize) -> Self {
        self.max_execution_context_depth = depth;
        self
    }

    pub fn with_global_bindings(mut self, install: bool) -> Self {
        self.install_global_bindings = install;
        self
    }
}
