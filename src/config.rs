//! Runner configuration
//!
//! [`RunnerConfig`] selects the engine and compile mode passed to
//! `aclopCompileAndExecute` and whether each run emits a trace line.

use once_cell::sync::Lazy;

use crate::acl::{AclCompileType, AclEngineType};

/// Environment variable that enables the per-run trace when present
pub const DEBUG_TRACE_ENV: &str = "DIOPI_DEBUG_ACLOPRUNNER";

/// Read once per process; later changes to the environment are ignored
static DEBUG_TRACE_FROM_ENV: Lazy<bool> = Lazy::new(|| std::env::var_os(DEBUG_TRACE_ENV).is_some());

/// Whether `DIOPI_DEBUG_ACLOPRUNNER` was set when first queried
pub fn debug_trace_from_env() -> bool {
    *DEBUG_TRACE_FROM_ENV
}

/// Configuration for [`AclOpRunner`](crate::runner::AclOpRunner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunnerConfig {
    /// Engine the compiler targets
    pub engine_type: AclEngineType,

    /// Compile mode
    pub compile_type: AclCompileType,

    /// Emit an `info!` trace line after every run
    pub debug_trace: bool,
}

impl RunnerConfig {
    /// System-default engine and compile mode, tracing off
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `debug_trace` taken from `DIOPI_DEBUG_ACLOPRUNNER`
    pub fn from_env() -> Self {
        Self::default().with_debug_trace(debug_trace_from_env())
    }

    pub fn with_engine_type(mut self, engine_type: AclEngineType) -> Self {
        self.engine_type = engine_type;
        self
    }

    pub fn with_compile_type(mut self, compile_type: AclCompileType) -> Self {
        self.compile_type = compile_type;
        self
    }

    pub fn with_debug_trace(mut self, debug_trace: bool) -> Self {
        self.debug_trace = debug_trace;
        self
    }
}
