use std::path::PathBuf;

use clap::Parser;
use log::info;
use yolo_scaling_plots::{
    cli, render, Dataset, RenderOptions, Result, StrongRow, StrongScalabilityChart,
};

/// Plot batch_size vs execution time colored by number of workers
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// CSV file (execution_time,worker_count,batch_size,...)
    csv: PathBuf,

    /// Output image path (png/svg)
    #[arg(long, default_value = "batch_vs_time.png")]
    out: PathBuf,

    /// Show plot interactively
    #[arg(long)]
    show: bool,
}

fn run(args: Args) -> Result<()> {
    let dataset = Dataset::<StrongRow>::load(&args.csv)?;
    info!("{} runs read from {}", dataset.len(), args.csv.display());

    let chart = StrongScalabilityChart::new(&dataset)?;
    render::publish(
        &chart,
        &RenderOptions {
            out: args.out,
            show: args.show,
        },
    )
}

fn main() {
    cli::init_logging();
    cli::exit_on_error(run(Args::parse()));
}
