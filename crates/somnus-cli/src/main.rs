use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use somnus_lib::{
    config::StatsConfig,
    detectors::transient::transients,
    io::{csv as csv_io, text as text_io},
    metrics::sleep::{sleep_stats, StatEntry, StatValue},
    plot::{hypnogram_figure, save_png, RenderOptions},
    signal::Hypnogram,
};
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "somnus", version, about = "Somnus: hypnogram analysis tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Find stage transitions in labels read from stdin or --input file
    HypnoTransients {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Read labels from this CSV/TSV column instead of one label per line
        #[arg(long)]
        column: Option<String>,
        /// Time vector (one value per label) used to express segment bounds
        #[arg(long)]
        xvec: Option<PathBuf>,
    },
    /// Sleep statistics (TDT, SPT, WASO, TST, SE, stage durations, latencies)
    HypnoStats {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        column: Option<String>,
        /// Sample count of the recording before down-sampling
        #[arg(long)]
        n: Option<usize>,
        /// TOML file with sf / sfori / time_window
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        sf: Option<f64>,
        #[arg(long)]
        sfori: Option<f64>,
        /// Epoch length in seconds
        #[arg(long)]
        time_window: Option<f64>,
        /// Name reported in the Filename row (defaults to --input)
        #[arg(long)]
        filename: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Render the hypnogram to a PNG via plotters
    HypnoPlot {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 100.0)]
        sf: f64,
        /// Clock time of the first sample, seconds after midnight
        #[arg(long, default_value_t = 0.0)]
        tstart: f64,
        #[arg(long)]
        grid: bool,
        #[arg(long, default_value_t = 600)]
        dpi: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::HypnoTransients {
            input,
            column,
            xvec,
        } => cmd_hypno_transients(input.as_deref(), column.as_deref(), xvec.as_deref())?,
        Commands::HypnoStats {
            input,
            column,
            n,
            config,
            sf,
            sfori,
            time_window,
            filename,
            format,
        } => {
            let mut cfg = match config {
                Some(path) => StatsConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => StatsConfig::default(),
            };
            cfg.sf = sf.unwrap_or(cfg.sf);
            cfg.sfori = sfori.unwrap_or(cfg.sfori);
            cfg.time_window = time_window.unwrap_or(cfg.time_window);
            let filename = filename.or_else(|| input.clone());
            cmd_hypno_stats(
                input.as_deref(),
                column.as_deref(),
                n,
                &cfg,
                filename.as_deref(),
                format,
            )?
        }
        Commands::HypnoPlot {
            input,
            column,
            out,
            sf,
            tstart,
            grid,
            dpi,
        } => cmd_hypno_plot(
            input.as_deref(),
            column.as_deref(),
            &out,
            sf,
            tstart,
            grid,
            dpi,
        )?,
    }
    Ok(())
}

fn read_labels(input: Option<&Path>, column: Option<&str>) -> Result<Vec<i32>> {
    match (input, column) {
        (Some(path), Some(column)) => csv_io::read_label_column(path, column),
        (Some(path), None) => text_io::read_label_series(path),
        (None, Some(_)) => anyhow::bail!("--column requires --input"),
        (None, None) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_label_series(&buf)
        }
    }
}

fn cmd_hypno_transients(
    input: Option<&Path>,
    column: Option<&str>,
    xvec: Option<&Path>,
) -> Result<()> {
    let labels = read_labels(input, column)?;
    let coords = xvec.map(text_io::read_f64_series).transpose()?;
    let result = transients(&labels, coords.as_deref())?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

fn cmd_hypno_stats(
    input: Option<&Path>,
    column: Option<&str>,
    n: Option<usize>,
    cfg: &StatsConfig,
    filename: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let labels = read_labels(input, column)?;
    // Without an explicit count, assume the labels span the whole recording.
    let n = n.unwrap_or_else(|| (labels.len() as f64 * cfg.sfori / cfg.sf).round() as usize);
    let stats = sleep_stats(filename, &labels, n, cfg)?;
    info!(
        "{} labels -> {} epochs of {} s",
        labels.len(),
        stats.epochs,
        cfg.time_window
    );
    let entries = stats.entries();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&entries)?),
        OutputFormat::Table => print!("{}", format_table(&entries)),
    }
    Ok(())
}

fn format_table(entries: &[StatEntry]) -> String {
    let width = entries.iter().map(|e| e.label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let value = match &entry.value {
            StatValue::Text(text) => text.clone(),
            StatValue::Number(Some(v)) => format!("{}", v),
            StatValue::Number(None) => "n/a".into(),
        };
        out.push_str(&format!("{:<width$}  {}\n", entry.label, value, width = width));
    }
    out
}

fn cmd_hypno_plot(
    input: Option<&Path>,
    column: Option<&str>,
    out: &Path,
    sf: f64,
    tstart: f64,
    grid: bool,
    dpi: u32,
) -> Result<()> {
    let hyp = Hypnogram::new(sf, read_labels(input, column)?);
    info!("{} labels, {:.0} s of recording", hyp.len(), hyp.duration());
    let fig = hypnogram_figure(&hyp.labels, hyp.fs, tstart, grid)?;
    let opts = RenderOptions {
        dpi,
        ..RenderOptions::default()
    };
    save_png(out, &fig, &opts).with_context(|| format!("writing {}", out.display()))?;
    info!("wrote {}", out.display());
    Ok(())
}
