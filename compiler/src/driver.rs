//! Compilation driver.
//!
//! Runs parse, collect and resolve over a set of source buffers. Each phase
//! fans out over the files with rayon and finishes for every file before the
//! next phase starts, so resolution always sees the declarations of the whole
//! compilation. All files share one `ScopeTree`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use cinder_core::ast::Program;
use cinder_core::{DiagnosticList, SourceBuffer, parse};
use rayon::prelude::*;

use crate::semantics::symbols::{ScopeTree, collect, resolve};
use crate::semantics::TypedProgram;

/// Environment variable holding the worker count.
pub const JOBS_VAR: &str = "CINDER_JOBS";
/// Environment variable naming the last phase to run.
pub const STOP_AFTER_VAR: &str = "CINDER_STOP_AFTER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Parse,
    Collect,
    Resolve,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Collect => "collect",
            Phase::Resolve => "resolve",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "parse" => Ok(Phase::Parse),
            "collect" => Ok(Phase::Collect),
            "resolve" => Ok(Phase::Resolve),
            _ => Err(ConfigError::InvalidValue {
                variable: STOP_AFTER_VAR,
                value: text.to_string(),
                expected: "one of parse, collect, resolve",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {variable}: expected {expected}")]
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("failed to start {jobs} compilation workers")]
    WorkerPool {
        jobs: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Last phase to run.
    pub stop_after: Phase,
    /// Worker count; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Register the native types in the global scope.
    pub natives: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            stop_after: Phase::Resolve,
            jobs: None,
            natives: true,
        }
    }
}

impl CompileOptions {
    /// Defaults overridden by `CINDER_JOBS` and `CINDER_STOP_AFTER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut options = Self::default();

        if let Some(raw) = lookup(JOBS_VAR) {
            let jobs = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|jobs| *jobs > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    variable: JOBS_VAR,
                    value: raw.clone(),
                    expected: "a positive integer",
                })?;
            options.jobs = Some(jobs);
        }

        if let Some(raw) = lookup(STOP_AFTER_VAR) {
            options.stop_after = raw.parse()?;
        }

        Ok(options)
    }
}

/// Everything the driver knows about one source file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub source: Arc<SourceBuffer>,
    pub syntax: Option<Program>,
    pub typed: Option<TypedProgram>,
    /// Last phase the file went through without errors.
    pub completed: Option<Phase>,
    pub diagnostics: DiagnosticList,
}

impl CompilationUnit {
    fn new(source: Arc<SourceBuffer>) -> Self {
        Self {
            source,
            syntax: None,
            typed: None,
            completed: None,
            diagnostics: DiagnosticList::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    fn parse(&mut self) {
        let output = parse(Arc::clone(&self.source));
        self.diagnostics.extend(output.diagnostics);
        if !self.diagnostics.has_errors() {
            self.syntax = output.program;
            self.completed = Some(Phase::Parse);
        }
    }

    fn collect(&mut self, scopes: &ScopeTree) {
        let Some(program) = &self.syntax else {
            return;
        };

        let output = collect(scopes, program, &self.source);
        self.diagnostics.extend(output.diagnostics);
        if output.program.is_some() {
            self.typed = output.program;
            self.completed = Some(Phase::Collect);
        }
    }

    fn resolve(&mut self, scopes: &ScopeTree) {
        let Some(program) = self.typed.take() else {
            return;
        };

        let output = resolve(scopes, program, &self.source);
        self.diagnostics.extend(output.diagnostics);
        if output.program.is_some() {
            self.typed = output.program;
            self.completed = Some(Phase::Resolve);
        }
    }
}

/// Result of `compile`.
#[derive(Debug)]
pub struct Compilation {
    pub scopes: Arc<ScopeTree>,
    /// One unit per source, in input order.
    pub units: Vec<CompilationUnit>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.units.iter().any(CompilationUnit::has_errors)
    }

    pub fn error_count(&self) -> usize {
        self.units
            .iter()
            .map(|unit| unit.diagnostics.error_count())
            .sum()
    }

    /// Diagnostics of every unit, each unit sorted by line then column.
    pub fn render_diagnostics(&self) -> String {
        self.units
            .iter()
            .map(|unit| unit.diagnostics.to_string())
            .collect()
    }
}

/// Compile `sources` as one compilation.
#[tracing::instrument(skip_all, fields(files = sources.len(), stop_after = %options.stop_after))]
pub fn compile(
    sources: Vec<Arc<SourceBuffer>>,
    options: &CompileOptions,
) -> Result<Compilation, CompileError> {
    let scopes = Arc::new(if options.natives {
        ScopeTree::with_natives()
    } else {
        ScopeTree::new()
    });
    let mut units: Vec<CompilationUnit> = sources.into_iter().map(CompilationUnit::new).collect();

    match options.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .thread_name(|index| format!("cinder-worker-{index}"))
                .build()
                .map_err(|source| CompileError::WorkerPool { jobs, source })?;
            pool.install(|| run_phases(&mut units, &scopes, options.stop_after));
        }
        None => run_phases(&mut units, &scopes, options.stop_after),
    }

    let compilation = Compilation { scopes, units };
    tracing::debug!(
        errors = compilation.error_count(),
        symbols = compilation.scopes.symbol_count(),
        "compiled"
    );
    Ok(compilation)
}

fn run_phases(units: &mut [CompilationUnit], scopes: &ScopeTree, stop_after: Phase) {
    units.par_iter_mut().for_each(CompilationUnit::parse);
    if stop_after == Phase::Parse {
        return;
    }

    units.par_iter_mut().for_each(|unit| unit.collect(scopes));
    if stop_after == Phase::Collect {
        return;
    }

    units.par_iter_mut().for_each(|unit| unit.resolve(scopes));
}
