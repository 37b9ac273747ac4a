//! Analysis options and the analysis pipeline

use std::str::FromStr;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::assembler::assemble;
use crate::elements::{SectionPropertyService, StandardSections};
use crate::error::{FrameError, FrameResult};
use crate::model::FrameModel;
use crate::results::{reconstruct, AnalysisResult};
use crate::solver::{FeSolver, StaticAnalysis};

/// Prefix of the environment variables read by [`AnalysisOptions::from_env`]
pub const ENV_PREFIX: &str = "FRAME_FEA_";

/// Options for a frame analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Target maximum sub-member length (m)
    pub segment_length: f64,
    /// Lower bound on the stiffness of the springs emulating a released DOF
    pub release_stiffness: f64,
    /// Release springs take this fraction of the member's own end stiffness
    /// along the released DOF, never less than `release_stiffness`
    pub release_ratio: f64,
    /// Load-control increments of the static analysis
    pub load_steps: usize,
    /// Convergence tolerance on the displacement increment norm
    pub tolerance: f64,
    /// Newton iterations allowed per load step
    pub max_iterations: usize,
    /// Diagram offset per unit of force (solver units)
    pub diagram_scale: f64,
    /// Document load units to solver force units (kN to N)
    pub load_factor: f64,
    /// Decimals of the reported force values
    pub precision: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            segment_length: 0.5,
            release_stiffness: 1e-12,
            release_ratio: 1e-8,
            load_steps: 10,
            tolerance: 1e-5,
            max_iterations: 50,
            diagram_scale: 1e-5,
            load_factor: 1e3,
            precision: 2,
        }
    }
}

impl AnalysisOptions {
    /// Defaults overridden by `FRAME_FEA_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up by variable name (`FRAME_FEA_SEGMENT_LENGTH`, ...).
    ///
    /// Unparsable values are logged and ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn set<T: FromStr>(field: &mut T, key: &str, lookup: &dyn Fn(&str) -> Option<String>) {
            let name = format!("{}{}", ENV_PREFIX, key);
            if let Some(raw) = lookup(&name) {
                match raw.trim().parse() {
                    Ok(value) => *field = value,
                    Err(_) => warn!("Ignoring {}={:?}: not a valid value", name, raw),
                }
            }
        }

        set(&mut self.segment_length, "SEGMENT_LENGTH", &lookup);
        set(&mut self.release_stiffness, "RELEASE_STIFFNESS", &lookup);
        set(&mut self.release_ratio, "RELEASE_RATIO", &lookup);
        set(&mut self.load_steps, "LOAD_STEPS", &lookup);
        set(&mut self.tolerance, "TOLERANCE", &lookup);
        set(&mut self.max_iterations, "MAX_ITERATIONS", &lookup);
        set(&mut self.diagram_scale, "DIAGRAM_SCALE", &lookup);
        set(&mut self.load_factor, "LOAD_FACTOR", &lookup);
        set(&mut self.precision, "PRECISION", &lookup);
        self
    }

    /// Set the target sub-member length
    pub fn with_segment_length(mut self, length: f64) -> Self {
        self.segment_length = length;
        self
    }

    /// Set the stiffness of release springs
    pub fn with_release_stiffness(mut self, stiffness: f64) -> Self {
        self.release_stiffness = stiffness;
        self
    }

    /// Set the fraction of member end stiffness given to release springs
    pub fn with_release_ratio(mut self, ratio: f64) -> Self {
        self.release_ratio = ratio;
        self
    }

    /// Set the number of load steps
    pub fn with_load_steps(mut self, steps: usize) -> Self {
        self.load_steps = steps;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    pub fn with_diagram_scale(mut self, scale: f64) -> Self {
        self.diagram_scale = scale;
        self
    }

    pub fn with_precision(mut self, decimals: u32) -> Self {
        self.precision = decimals;
        self
    }

    /// Parameters of the solver's static analysis
    pub fn static_analysis(&self) -> StaticAnalysis {
        StaticAnalysis {
            steps: self.load_steps,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }

    pub fn validate(&self) -> FrameResult<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FrameError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    name, value
                )))
            }
        };
        positive("segment_length", self.segment_length)?;
        positive("release_stiffness", self.release_stiffness)?;
        if !(self.release_ratio.is_finite() && self.release_ratio >= 0.0) {
            return Err(FrameError::InvalidInput(format!(
                "release_ratio must be non-negative, got {}",
                self.release_ratio
            )));
        }
        positive("tolerance", self.tolerance)?;
        positive("load_factor", self.load_factor)?;
        if self.load_steps == 0 {
            return Err(FrameError::InvalidInput("load_steps must be at least 1".into()));
        }
        Ok(())
    }
}

/// Run the full pipeline on `model` with the closed-form section properties
pub fn run_analysis<S: FeSolver>(
    model: &FrameModel,
    solver: &mut S,
    options: &AnalysisOptions,
) -> FrameResult<AnalysisResult> {
    run_analysis_with(model, solver, &StandardSections, options)
}

/// Validate, assemble, solve and reconstruct.
///
/// Nothing reaches `solver` unless the model and options validate. The solver
/// is reset before assembly and again afterwards, whatever the outcome; no
/// partial result is returned.
pub fn run_analysis_with<S: FeSolver>(
    model: &FrameModel,
    solver: &mut S,
    sections: &dyn SectionPropertyService,
    options: &AnalysisOptions,
) -> FrameResult<AnalysisResult> {
    options.validate()?;
    model.validate_with(sections)?;
    info!(
        "Analysing {} nodes, {} members, {} loads",
        model.nodes.len(),
        model.members.len(),
        model.loads.len()
    );

    solver.reset();
    let outcome = solve(model, solver, sections, options);
    solver.reset();

    match &outcome {
        Err(FrameError::SolverNumerical(message)) => {
            error!("Solver numerical error: {}", message);
            error!("Model at failure:\n{}", model.diagnostic_dump());
        }
        Err(err) => error!("Analysis failed: {}", err),
        Ok(_) => info!("Analysis complete"),
    }
    outcome
}

fn solve<S: FeSolver>(
    model: &FrameModel,
    solver: &mut S,
    sections: &dyn SectionPropertyService,
    options: &AnalysisOptions,
) -> FrameResult<AnalysisResult> {
    let assembly = assemble(model, solver, options, sections)?;

    let analysis = options.static_analysis();
    info!(
        "Running static analysis: {} steps, tolerance {:e}",
        analysis.steps, analysis.tolerance
    );
    solver.analyze(&analysis)?;

    reconstruct(model, &assembly, solver, options)
}
