//! Purpose: Define the capability contract between the core and the simulation engine.
//! Exports: `EngineModel`, `CaseLoader`, parameter and status types.
//! Role: Narrow seam around the external numerical solver; the core never reaches
//! Role: past these traits into engine internals.
//! Invariants: An adapter implements the full accessor contract or fails at
//! Invariants: integration time; there is no optional-capability probing at call time.
//! Invariants: A model instance is stateful and non-reentrant; callers serialize
//! Invariants: access (the session layer holds one lock per model).

use std::path::Path;

use crate::core::error::Error;
use crate::core::numeric::Column;

pub mod synthetic;

/// Options applied when constructing a model from a case file.
#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    /// Run system setup after parsing the case.
    pub setup: bool,
    /// Suppress engine-side output file generation.
    pub no_output: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            setup: true,
            no_output: true,
        }
    }
}

/// Per-call overrides for the power flow routine. `None` keeps the engine default.
#[derive(Clone, Debug, Default)]
pub struct PowerFlowParams {
    pub tol: Option<f64>,
    pub max_iter: Option<u32>,
    pub method: Option<String>,
}

/// Per-call overrides for time-domain integration. `None` keeps the engine default.
#[derive(Clone, Debug, Default)]
pub struct TimeDomainParams {
    pub end_time: Option<f64>,
    pub step: Option<f64>,
    pub tol: Option<f64>,
    pub method: Option<String>,
}

/// Instance count for one component model, reported only when non-zero.
#[derive(Clone, Debug)]
pub struct ComponentCount {
    pub model: String,
    pub group: String,
    pub count: usize,
}

/// Shape of the differential-algebraic system.
#[derive(Clone, Copy, Debug)]
pub struct DaeShape {
    pub n_states: usize,
    pub n_algebraic: usize,
    pub time: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PowerFlowStatus {
    pub converged: bool,
    pub iterations: u32,
    pub exec_time: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TimeDomainStatus {
    /// The integrator has been initialized and holds a time series.
    pub initialized: bool,
    /// The last run returned without raising.
    pub completed: bool,
    /// The engine flagged an internal failure state during the run.
    pub busted: bool,
    pub exec_time: Option<f64>,
    pub t_start: f64,
    pub t_end: f64,
}

/// Per-bus solution arrays, aligned by index.
#[derive(Clone, Debug)]
pub struct BusTable {
    pub ids: Column,
    pub names: Vec<String>,
    pub voltage: Vec<f64>,
    pub angle: Vec<f64>,
}

/// One generator-bearing component model's output arrays.
///
/// `EngineModel::generator_blocks` yields blocks in a fixed model order so that
/// concatenated arrays are deterministic across calls.
#[derive(Clone, Debug)]
pub struct GeneratorBlock {
    pub model: String,
    pub ids: Column,
    pub p: Vec<f64>,
    pub q: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct EigenSolution {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
    pub n_positive: usize,
    pub n_zeros: usize,
    pub n_negative: usize,
    pub participation: Option<Vec<Vec<f64>>>,
    pub state_names: Vec<String>,
    pub exec_time: Option<f64>,
}

/// Accessor and analysis contract over one loaded model instance.
///
/// Analysis methods mutate solver state; accessors are read-only. Engine
/// failures surface as `ErrorKind::Engine`, never as panics.
pub trait EngineModel: Send {
    fn name(&self) -> &str;
    fn case_path(&self) -> &str;
    fn is_setup(&self) -> bool;
    fn component_counts(&self) -> Vec<ComponentCount>;
    fn dae_shape(&self) -> DaeShape;
    fn frequency(&self) -> f64;
    fn power_base(&self) -> f64;

    fn run_power_flow(&mut self, params: &PowerFlowParams) -> Result<(), Error>;
    fn power_flow(&self) -> PowerFlowStatus;
    fn buses(&self) -> BusTable;
    fn generator_blocks(&self) -> Vec<GeneratorBlock>;

    fn run_time_domain(&mut self, params: &TimeDomainParams) -> Result<(), Error>;
    fn time_domain(&self) -> TimeDomainStatus;
    fn time_axis(&self) -> &[f64];
    fn state_names(&self) -> &[String];
    fn algebraic_names(&self) -> &[String];
    fn state_series(&self, index: usize) -> Vec<f64>;
    fn algebraic_series(&self, index: usize) -> Vec<f64>;

    fn run_eigenvalue(&mut self) -> Result<(), Error>;
    fn eigenvalues(&self) -> Option<&EigenSolution>;
}

/// Constructs model instances from case files.
///
/// `load` either returns a fully constructed model or an error with every
/// partially constructed resource already released; there is no deferred
/// cleanup for failed loads.
pub trait CaseLoader: Send + Sync {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<Box<dyn EngineModel>, Error>;
}
