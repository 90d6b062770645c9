//! Commandline utility to turn a tracking package into orientation-grouped
//! image and segmentation files for 3D Slicer.

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use tracknii::export::OutputFormat;
use tracknii::pairing::CountPolicy;
use tracknii::{run, PipelineConfig};

// use clap to create commandline interface
#[derive(Parser, Debug)]
#[command(author, about, version, long_about)]
struct Args {
    /// the package directory holding the images, the Segmentation volume and
    /// the Transforms table
    input: PathBuf,

    /// where to write the results. Defaults to a directory next to the input
    /// named `<input>_output`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// fail when the number of translations and images differ, instead of
    /// aligning only the images that have a translation
    #[arg(long)]
    strict: bool,

    /// fail when more than this many distinct image orientations are found
    #[arg(long)]
    max_orientations: Option<usize>,

    /// write gzip compressed `.nii.gz` files
    #[arg(short = 'z', long)]
    gzip: bool,

    /// print debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new(&self.input);
        config.output = self.output.clone();
        config.max_orientations = self.max_orientations;
        if self.strict {
            config.count_policy = CountPolicy::Strict;
        }
        if self.gzip {
            config.format = OutputFormat::NiiGz;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Args::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match run(&cli.to_config()) {
        Ok(summary) => {
            println!(
                "Aligned {} images into {} orientations: {}",
                summary.total_pairs(),
                summary.slots.len(),
                summary.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error! {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::from(e.exit_code())
        }
    }
}
