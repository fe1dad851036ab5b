//! Purpose: Deterministic stand-in engine for demos and tests.
//! Exports: `SyntheticLoader`, `SyntheticModel`.
//! Role: Implements the full capability contract with fabricated data; this is
//! Role: the seam where a real solver adapter plugs in.
//! Invariants: No numerical solving happens here, only data generation.
//! Invariants: Identical inputs produce identical outputs (tests rely on it).
//!
//! File-stem knobs drive failure paths without special casing in the core:
//! a stem containing `corrupt` fails to load, `diverge` yields a
//! non-converging power flow, and `unstable` marks the time-domain run busted.

use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::numeric::Column;

use super::{
    BusTable, CaseLoader, ComponentCount, DaeShape, EigenSolution, EngineModel, GeneratorBlock,
    LoadOptions, PowerFlowParams, TimeDomainParams,
};

const DEFAULT_END_TIME: f64 = 20.0;
const DEFAULT_STEP: f64 = 1.0 / 30.0;

const STATE_NAMES: [&str; 4] = [
    "delta_GENROU_1",
    "omega_GENROU_1",
    "delta_GENROU_2",
    "omega_GENROU_2",
];
const ALGEBRAIC_NAMES: [&str; 6] = [
    "a_Bus_1", "v_Bus_1", "a_Bus_2", "v_Bus_2", "a_Bus_3", "v_Bus_3",
];

pub struct SyntheticLoader;

impl CaseLoader for SyntheticLoader {
    fn load(&self, path: &Path, options: &LoadOptions) -> Result<Box<dyn EngineModel>, Error> {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("untitled")
            .to_string();
        if stem.contains("corrupt") {
            return Err(Error::new(ErrorKind::Engine)
                .with_message("case file is corrupted or in an unsupported format")
                .with_path(path));
        }
        Ok(Box::new(SyntheticModel::new(
            stem,
            path.display().to_string(),
            options.setup,
        )))
    }
}

pub struct SyntheticModel {
    name: String,
    case_path: String,
    is_setup: bool,
    diverge: bool,
    unstable: bool,
    pflow: super::PowerFlowStatus,
    voltage: Vec<f64>,
    angle: Vec<f64>,
    tds: super::TimeDomainStatus,
    time: Vec<f64>,
    state_names: Vec<String>,
    algebraic_names: Vec<String>,
    state_data: Vec<Vec<f64>>,
    algebraic_data: Vec<Vec<f64>>,
    eigen: Option<EigenSolution>,
}

impl SyntheticModel {
    pub fn new(name: String, case_path: String, is_setup: bool) -> Self {
        let diverge = name.contains("diverge");
        let unstable = name.contains("unstable");
        Self {
            name,
            case_path,
            is_setup,
            diverge,
            unstable,
            pflow: super::PowerFlowStatus::default(),
            voltage: Vec::new(),
            angle: Vec::new(),
            tds: super::TimeDomainStatus::default(),
            time: Vec::new(),
            state_names: STATE_NAMES.iter().map(|s| s.to_string()).collect(),
            algebraic_names: ALGEBRAIC_NAMES.iter().map(|s| s.to_string()).collect(),
            state_data: Vec::new(),
            algebraic_data: Vec::new(),
            eigen: None,
        }
    }

    fn state_value(index: usize, t: f64) -> f64 {
        let k = index as f64;
        1.0 + 0.02 * (k + 1.0) * (-0.4 * t).exp() * (3.0 * t + k).cos()
    }

    fn algebraic_value(index: usize, t: f64) -> f64 {
        let k = index as f64;
        if index % 2 == 0 {
            -0.05 * k * (1.0 - (-t).exp())
        } else {
            1.0 + 0.01 * (-0.3 * t).exp() * (2.0 * t + k).sin()
        }
    }
}

impl EngineModel for SyntheticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn case_path(&self) -> &str {
        &self.case_path
    }

    fn is_setup(&self) -> bool {
        self.is_setup
    }

    fn component_counts(&self) -> Vec<ComponentCount> {
        let counts = [
            ("Bus", "ACTopology", 3),
            ("Line", "ACLine", 3),
            ("Slack", "StaticGen", 1),
            ("PV", "StaticGen", 1),
            ("PQ", "StaticLoad", 1),
            ("GENROU", "SynGen", 2),
        ];
        counts
            .iter()
            .map(|(model, group, count)| ComponentCount {
                model: model.to_string(),
                group: group.to_string(),
                count: *count,
            })
            .collect()
    }

    fn dae_shape(&self) -> DaeShape {
        DaeShape {
            n_states: self.state_names.len(),
            n_algebraic: self.algebraic_names.len(),
            time: self.time.last().copied().unwrap_or(0.0),
        }
    }

    fn frequency(&self) -> f64 {
        60.0
    }

    fn power_base(&self) -> f64 {
        100.0
    }

    fn run_power_flow(&mut self, params: &PowerFlowParams) -> Result<(), Error> {
        if self.diverge {
            self.pflow = super::PowerFlowStatus {
                converged: false,
                iterations: params.max_iter.unwrap_or(25),
                exec_time: 0.004,
            };
            return Ok(());
        }
        self.pflow = super::PowerFlowStatus {
            converged: true,
            iterations: 4,
            exec_time: 0.002,
        };
        self.voltage = vec![1.06, 1.045, 1.01];
        self.angle = vec![0.0, -0.087, -0.222];
        Ok(())
    }

    fn power_flow(&self) -> super::PowerFlowStatus {
        self.pflow.clone()
    }

    fn buses(&self) -> BusTable {
        BusTable {
            ids: Column::Int(vec![1, 2, 3]),
            names: vec!["Bus_1".to_string(), "Bus_2".to_string(), "Bus_3".to_string()],
            voltage: self.voltage.clone(),
            angle: self.angle.clone(),
        }
    }

    fn generator_blocks(&self) -> Vec<GeneratorBlock> {
        // Fixed model order keeps concatenated arrays deterministic.
        vec![
            GeneratorBlock {
                model: "Slack".to_string(),
                ids: Column::Int(vec![1]),
                p: vec![2.324],
                q: vec![-0.169],
            },
            GeneratorBlock {
                model: "PV".to_string(),
                ids: Column::Int(vec![2]),
                p: vec![0.4],
                q: vec![0.424],
            },
            GeneratorBlock {
                model: "PQ".to_string(),
                ids: Column::Int(vec![3]),
                p: vec![-0.942],
                q: vec![-0.19],
            },
        ]
    }

    fn run_time_domain(&mut self, params: &TimeDomainParams) -> Result<(), Error> {
        let end_time = params.end_time.unwrap_or(DEFAULT_END_TIME);
        let step = params.step.unwrap_or(DEFAULT_STEP);
        if end_time <= 0.0 || step <= 0.0 {
            return Err(Error::new(ErrorKind::Engine)
                .with_message("end time and step must be positive"));
        }

        let n_points = (end_time / step).round() as usize + 1;
        self.time = (0..n_points).map(|i| i as f64 * step).collect();
        self.state_data = (0..self.state_names.len())
            .map(|k| self.time.iter().map(|t| Self::state_value(k, *t)).collect())
            .collect();
        self.algebraic_data = (0..self.algebraic_names.len())
            .map(|k| {
                self.time
                    .iter()
                    .map(|t| Self::algebraic_value(k, *t))
                    .collect()
            })
            .collect();
        self.tds = super::TimeDomainStatus {
            initialized: true,
            completed: true,
            busted: self.unstable,
            exec_time: Some(0.5),
            t_start: 0.0,
            t_end: end_time,
        };
        Ok(())
    }

    fn time_domain(&self) -> super::TimeDomainStatus {
        self.tds.clone()
    }

    fn time_axis(&self) -> &[f64] {
        &self.time
    }

    fn state_names(&self) -> &[String] {
        &self.state_names
    }

    fn algebraic_names(&self) -> &[String] {
        &self.algebraic_names
    }

    fn state_series(&self, index: usize) -> Vec<f64> {
        self.state_data.get(index).cloned().unwrap_or_default()
    }

    fn algebraic_series(&self, index: usize) -> Vec<f64> {
        self.algebraic_data.get(index).cloned().unwrap_or_default()
    }

    fn run_eigenvalue(&mut self) -> Result<(), Error> {
        let n = self.state_names.len();
        let real: Vec<f64> = (0..n).map(|i| -0.4 - 0.3 * (i % 2) as f64).collect();
        let imag: Vec<f64> = (0..n)
            .map(|i| if i % 2 == 0 { 3.0 } else { -3.0 })
            .collect();
        let n_negative = real.iter().filter(|r| **r < 0.0).count();
        let n_positive = real.iter().filter(|r| **r > 0.0).count();
        let participation = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        self.eigen = Some(EigenSolution {
            real,
            imag,
            n_positive,
            n_zeros: n - n_positive - n_negative,
            n_negative,
            participation: Some(participation),
            state_names: self.state_names.clone(),
            exec_time: Some(0.01),
        });
        Ok(())
    }

    fn eigenvalues(&self) -> Option<&EigenSolution> {
        self.eigen.as_ref()
    }
}
