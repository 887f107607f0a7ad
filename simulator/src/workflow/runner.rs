use std::sync::Arc;

use crate::generator::profile::GeneratorConfig;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use rlancore::prelude::ProcessingStage;
use rlancore::telemetry::{Metrics, MetricsRecorder};
use rlancore::{RayInput, RlanLocator, RlanOutput, StageSummary};
use serde::Serialize;

/// Per-ray outcome, scored against the generator's interference segment.
#[derive(Debug, Clone, Serialize)]
pub struct RaySummary {
    pub azimuth_deg: f64,
    pub stage: StageSummary,
    pub flagged_in_interference: usize,
    pub flagged_outside: usize,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResult {
    pub rays: Vec<RaySummary>,
    pub metrics: Metrics,
    #[serde(skip)]
    pub outputs: Vec<RlanOutput>,
}

impl WorkflowResult {
    pub fn total_flagged(&self) -> usize {
        self.rays.iter().map(|ray| ray.stage.n_flagged).sum()
    }

    pub fn total_false_alarms(&self) -> usize {
        self.rays.iter().map(|ray| ray.flagged_outside).sum()
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Run every ray through one locator. With `keep_outputs` the full
    /// per-gate diagnostics of each ray are returned as well.
    pub fn execute(&self, rays: &[RayInput], keep_outputs: bool) -> anyhow::Result<WorkflowResult> {
        let metrics = Arc::new(MetricsRecorder::new());
        let mut locator = RlanLocator::new();
        locator
            .initialize(&self.config.locator)
            .context("initializing RLAN locator")?;
        locator.set_metrics(Arc::clone(&metrics));

        let mut summaries = Vec::with_capacity(rays.len());
        let mut outputs = Vec::new();
        for (ray_index, ray) in rays.iter().enumerate() {
            let stage = locator
                .execute(ray)
                .with_context(|| format!("locating RLAN in ray {}", ray_index))?;
            let (flagged_in_interference, flagged_outside) =
                score_flags(&self.config.generator, locator.rlan_flag());
            summaries.push(RaySummary {
                azimuth_deg: ray.props.azimuth_deg,
                stage,
                flagged_in_interference,
                flagged_outside,
            });
            if keep_outputs {
                outputs.push(locator.output());
            }
        }
        locator.cleanup();

        let metrics = metrics.snapshot();
        info!(
            "processed {} rays, skipped {}, flagged {} gates",
            metrics.rays_processed, metrics.rays_skipped, metrics.gates_flagged
        );

        Ok(WorkflowResult {
            rays: summaries,
            metrics,
            outputs,
        })
    }
}

fn score_flags(generator: &GeneratorConfig, flags: &[bool]) -> (usize, usize) {
    flags
        .iter()
        .enumerate()
        .filter(|&(_, &flag)| flag)
        .fold((0, 0), |(inside, outside), (gate, _)| {
            if generator.in_interference(gate) {
                (inside + 1, outside)
            } else {
                (inside, outside + 1)
            }
        })
}
