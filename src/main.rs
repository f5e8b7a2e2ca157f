//! CLI entry point for photomosaic generation

use clap::Parser;
use mosaictile::io::cli::{Cli, MosaicProcessor};

fn main() -> mosaictile::Result<()> {
    let cli = Cli::parse();
    let mut processor = MosaicProcessor::new(cli);
    processor.process()
}
