//! One full run, from input directory to exported slots.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::align::Aligner;
use crate::common::DirectionMatrix;
use crate::error::TrackError;
use crate::export::{OutputFormat, SliceExporter};
use crate::layout::{default_output_dir, scan_input_dir};
use crate::orientation::{OrientationLabel, OrientationRegistry};
use crate::pairing::{pair_inputs, CountMismatch, CountPolicy};
use crate::translations::load_translations;
use crate::volume::Volume;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Defaults to `<input>_output`.
    pub output: Option<PathBuf>,
    pub count_policy: CountPolicy,
    /// Unlimited when `None`.
    pub max_orientations: Option<usize>,
    pub format: OutputFormat,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            count_policy: CountPolicy::default(),
            max_orientations: None,
            format: OutputFormat::default(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_dir(&self.input))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    pub index: usize,
    pub label: Option<OrientationLabel>,
    pub direction: DirectionMatrix,
    pub pairs: usize,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub jobs: usize,
    pub mismatch: Option<CountMismatch>,
    pub slots: Vec<SlotSummary>,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn total_pairs(&self) -> usize {
        self.slots.iter().map(|s| s.pairs).sum()
    }
}

pub fn run(config: &PipelineConfig) -> Result<RunSummary, TrackError> {
    let layout = scan_input_dir(&config.input)?;
    info!(
        "Found {} images, segmentation {}, translations {} ({} ignored)",
        layout.images.len(),
        layout.segmentation.display(),
        layout.translations.display(),
        layout.ignored.len()
    );

    let translations = load_translations(&layout.translations)?;
    let pairing = pair_inputs(layout.images, translations, config.count_policy)?;

    let aligner = Aligner::new(Volume::load(&layout.segmentation)?);

    let output_dir = config.output_dir();
    create_output_dir(&output_dir)?;
    let mut registry = match config.max_orientations {
        Some(capacity) => OrientationRegistry::with_capacity_limit(capacity),
        None => OrientationRegistry::new(),
    };
    aligner.align_all(&pairing.jobs, &mut registry)?;
    info!(
        "Aligned {} images into {} orientations",
        registry.total_pairs(),
        registry.len()
    );

    let mut exporter = SliceExporter::new(&output_dir, config.format);
    let mut written = Vec::new();
    for slot in registry.slots() {
        written.extend(exporter.export_slot(slot)?);
    }

    let slots = registry
        .slots()
        .iter()
        .enumerate()
        .map(|(index, slot)| SlotSummary {
            index,
            label: slot.label(),
            direction: *slot.direction(),
            pairs: slot.len(),
        })
        .collect();

    let summary = RunSummary {
        output_dir,
        jobs: pairing.jobs.len(),
        mismatch: pairing.mismatch,
        slots,
        written,
    };
    log_summary(&summary);
    Ok(summary)
}

fn create_output_dir(path: &Path) -> Result<(), TrackError> {
    fs::create_dir_all(path).map_err(|source| TrackError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

fn log_summary(summary: &RunSummary) {
    for slot in &summary.slots {
        info!(
            "Slot {}: {} pairs, label {}",
            slot.index,
            slot.pairs,
            slot.label.map_or("(empty)", |l| l.as_str())
        );
    }
    info!(
        "Wrote {} files to {}",
        summary.written.len(),
        summary.output_dir.display()
    );
}
