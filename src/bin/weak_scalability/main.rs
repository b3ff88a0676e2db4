use std::path::PathBuf;

use clap::Parser;
use log::info;
use yolo_scaling_plots::{
    cli, render, Dataset, RenderOptions, Result, WeakRow, WeakScalabilityChart,
};

/// Plot weak scalability: workers vs mean execution time, annotated with images tested
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// CSV file with execution_time,worker_count,images_tested,...
    csv: PathBuf,

    /// Output image path
    #[arg(long, default_value = "weak_scalability_plot.png")]
    out: PathBuf,

    /// Optional upper limit of the Y axis in seconds
    #[arg(long, allow_negative_numbers = true)]
    ymax_seconds: Option<f64>,

    /// Show plot interactively
    #[arg(long)]
    show: bool,
}

fn run(args: Args) -> Result<()> {
    let dataset = Dataset::<WeakRow>::load(&args.csv)?;
    info!("{} runs read from {}", dataset.len(), args.csv.display());

    let chart = WeakScalabilityChart::new(&dataset, args.ymax_seconds)?;
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
