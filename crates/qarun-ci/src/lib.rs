//! QA step execution for qarun.
//!
//! Plans the three fixed steps, runs them through a [`CommandRunner`] with
//! timeouts and full output capture, and evaluates the exit gate.

pub mod config;
pub mod discovery;
pub mod gate;
pub mod pipeline;
pub mod runner;
pub mod step;

pub use config::{QaRunConfig, DEFAULT_TIMEOUT_SECS};
pub use discovery::{discover_phpunit, discover_static_script, find_on_path, phpunit_config};
pub use gate::{GateVerdict, QaGate};
pub use pipeline::{PipelineResult, QaPipeline};
pub use runner::{
    render_command, run_step, CommandRunner, CommandSpec, ExitOutcome, ProcessRunner,
    RawExecution,
};
pub use step::{plan_steps, Prerequisites, StepPlan};
