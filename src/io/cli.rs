//! Command-line interface for building a photomosaic from a target and a tile folder

use crate::algorithm::executor::MosaicWorker;
use crate::algorithm::solver::{Assignment, DuplicatePolicy, SolveStrategy};
use crate::analysis::descriptor::DescriptorKind;
use crate::io::configuration::{
    DEFAULT_BLEND, DEFAULT_SCALE_FACTOR, DEFAULT_SEED, DEFAULT_UPSCALE, HD_OUTPUT_SUFFIX,
    OUTPUT_SUFFIX,
};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::image::{load_rgb, load_tiles, render_mosaic, save_png};
use crate::io::progress::ProgressReporter;
use crate::io::protocol::Message;
use crate::io::session::{PreparedRun, RunConfig, Session};
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mosaictile")]
#[command(
    author,
    version,
    about = "Assemble a photomosaic by assigning tile images to grid cells"
)]
/// Command-line arguments for the mosaic tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Target image the mosaic imitates
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Directory of tile images (PNG or JPEG)
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Grid cells per side of the target
    #[arg(short, long, default_value_t = DEFAULT_SCALE_FACTOR)]
    pub grid: u32,

    /// Opacity of the target drawn over the tiles (0 to 1)
    #[arg(short, long, default_value_t = DEFAULT_BLEND)]
    pub blend: f32,

    /// Descriptor used to compare cells and tiles
    #[arg(short, long, value_enum, default_value_t = DescriptorKind::MeanColor)]
    pub features: DescriptorKind,

    /// Allow a tile to fill more than one cell
    #[arg(short = 'd', long)]
    pub allow_duplicates: bool,

    /// Maximum cells per tile when duplicates are allowed (unlimited if omitted)
    #[arg(short = 'm', long, requires = "allow_duplicates")]
    pub max_uses: Option<usize>,

    /// Use the exact assignment solver instead of reduction with a greedy pass
    #[arg(long)]
    pub optimal: bool,

    /// Random seed for reproducible fallback choices
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Also export a high resolution version
    #[arg(long)]
    pub hd: bool,

    /// Resolution multiplier for the high resolution export
    #[arg(short, long, default_value_t = DEFAULT_UPSCALE)]
    pub upscale: u32,

    /// Output path (defaults to <TARGET>_mosaic.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the final `done` message with the assignment as JSON
    #[arg(short, long, value_name = "PATH")]
    pub assignment: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Duplicate policy selected by the flags
    pub const fn policy(&self) -> DuplicatePolicy {
        match (self.allow_duplicates, self.max_uses) {
            (false, _) => DuplicatePolicy::NoDuplicates,
            (true, Some(max_uses)) => DuplicatePolicy::capped(max_uses),
            (true, None) => DuplicatePolicy::uncapped(),
        }
    }

    /// Run parameters selected by the flags
    pub const fn run_config(&self) -> RunConfig {
        RunConfig {
            scale_factor: self.grid,
            policy: self.policy(),
            descriptor_kind: self.features,
            strategy: if self.optimal {
                SolveStrategy::Optimal
            } else {
                SolveStrategy::Reduction
            },
        }
    }

    /// Where the mosaic is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.target, OUTPUT_SUFFIX))
    }

    /// Where the high resolution mosaic is written
    pub fn hd_output_path(&self) -> PathBuf {
        self.output.as_ref().map_or_else(
            || sibling_path(&self.target, HD_OUTPUT_SUFFIX),
            |output| sibling_path(output, "_hd"),
        )
    }
}

// `<dir>/<stem><suffix>.png` next to the given file
fn sibling_path(input_path: &Path, suffix: &str) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let output_name = format!("{}{suffix}.png", stem.to_string_lossy());

    if let Some(parent) = input_path.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}

/// Orchestrates one mosaic run from loading images to writing outputs
pub struct MosaicProcessor {
    cli: Cli,
    progress: ProgressReporter,
}

impl MosaicProcessor {
    /// Create a processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = ProgressReporter::visible(cli.should_show_progress());
        Self { cli, progress }
    }

    /// Load the images, compute the assignment and write every requested output
    ///
    /// # Errors
    ///
    /// Returns an error if loading, describing, solving, rendering or saving fails
    pub fn process(&mut self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cli.blend) {
            return Err(invalid_parameter(
                "blend",
                &self.cli.blend,
                &"must be between 0 and 1",
            ));
        }

        self.progress.set_stage("Loading");
        let mut session = Session::new(self.cli.run_config());
        session.set_target(load_rgb(&self.cli.target)?);
        session.set_tiles(load_tiles(&self.cli.tiles)?);

        self.progress.set_stage("Describing");
        let PreparedRun { geometry, request } = session.build_request()?;

        self.progress.set_stage("Matching");
        let mut worker = MosaicWorker::spawn(self.cli.seed)?;
        let run_id = worker.submit(request)?;
        let assignment = worker.wait(run_id, |fraction| self.progress.update(fraction))?;

        self.progress.set_stage("Rendering");
        let target = session
            .target()
            .ok_or_else(|| invalid_parameter("target", &"<none>", &"target image not loaded"))?;
        let mosaic = render_mosaic(
            target,
            session.tiles(),
            &geometry,
            assignment.tiles(),
            self.cli.blend,
        )?;
        save_png(&mosaic, &self.cli.output_path())?;

        if self.cli.hd {
            let hd_geometry = geometry.scaled(self.cli.upscale)?;
            let hd = render_mosaic(
                target,
                session.tiles(),
                &hd_geometry,
                assignment.tiles(),
                self.cli.blend,
            )?;
            save_png(&hd, &self.cli.hd_output_path())?;
        }

        if let Some(path) = &self.cli.assignment {
            write_done_message(path, &assignment)?;
        }

        self.progress.finish("Done");
        self.report_fallbacks(&assignment, session.tiles().len());
        Ok(())
    }

    // Allow print for user feedback about random fallback cells
    #[allow(clippy::print_stderr)]
    fn report_fallbacks(&self, assignment: &Assignment, tile_count: usize) {
        let fallbacks = assignment.fallback_cells().len();
        if fallbacks == 0 || self.cli.quiet {
            return;
        }
        if self.cli.allow_duplicates {
            eprintln!(
                "All {tile_count} tiles reached their usage cap; {fallbacks} cells use a random tile"
            );
        } else {
            eprintln!(
                "Only {tile_count} tiles for {} cells; {fallbacks} cells use a random tile",
                assignment.len()
            );
        }
    }
}

fn write_done_message(path: &Path, assignment: &Assignment) -> Result<()> {
    let json = Message::Done {
        assignment: assignment.tiles().to_vec(),
    }
    .to_json()?;
    std::fs::write(path, json).map_err(|e| MosaicError::FileSystem {
        path: path.to_path_buf(),
        operation: "write assignment",
        source: e,
    })
}
