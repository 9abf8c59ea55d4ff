// Copyright 2025 Paygraph (https://github.com/paygraph)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Paygraph CLI
//!
//! Reads a file of JSON payment records (one per line) and writes the
//! rolling median degree of the windowed payment graph, one line per
//! accepted record.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use paygraph_core::{Processor, StreamStats, DEFAULT_WINDOW_SECS};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "paygraph")]
#[command(about = "Rolling median degree over a windowed payment graph", long_about = None)]
struct Args {
    /// Input file with one JSON payment record per line
    #[arg(short, long, default_value = "venmo_input/venmo-trans.txt")]
    input: PathBuf,

    /// Output file receiving one median per accepted record
    #[arg(short, long, default_value = "venmo_output/output.txt")]
    output: PathBuf,

    /// Trailing window width in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    window: i64,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
}

fn run(input: &Path, output: &Path, window: i64) -> Result<StreamStats> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening input file {}", input.display()))?,
    );

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("creating output file {}", output.display()))?,
    );

    let mut processor = Processor::with_window(window);
    processor
        .process_stream(reader, writer)
        .context("processing payment stream")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let stats = run(&args.input, &args.output, args.window)?;

    info!(
        processed = stats.processed,
        skipped = stats.skipped,
        output = %args.output.display(),
        "done"
    );
    Ok(())
}
