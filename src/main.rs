//! Kohonen CLI - Self-Organizing Map Engine
//!
//! Command-line interface for training, inspecting and applying SOMs.

use clap::{Parser, Subcommand};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use kohonen::{
    DistanceMetric, InitPolicy, KohonenError, Result, Som, SomConfig, TrainingMode, Variant,
};
use log::error;
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kohonen")]
#[command(author = "Kohonen Contributors")]
#[command(version)]
#[command(about = "Self-Organizing Map Engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new lattice on a numeric matrix file
    Train {
        /// Input data (one sample per line, whitespace or comma separated)
        #[arg(short, long)]
        input: PathBuf,

        /// Output snapshot file
        #[arg(short, long)]
        output: PathBuf,

        /// Grid width
        #[arg(short = 'x', long, default_value = "10")]
        dx: usize,

        /// Grid height
        #[arg(short = 'y', long, default_value = "10")]
        dy: usize,

        /// Initial learning rate in [0, 1]
        #[arg(short, long, default_value = "0.8")]
        eta: f64,

        /// Initial neighborhood radius (integer > 1)
        #[arg(short, long, default_value = "5")]
        radius: usize,

        /// Number of training iterations
        #[arg(short = 'n', long, default_value = "100")]
        iterations: usize,

        /// Distance metric (euclidean, sqeuclidean, cityblock, chebyshev, cosine)
        #[arg(short, long, default_value = "euclidean")]
        metric: DistanceMetric,

        /// Training mode (incremental, batch)
        #[arg(long, default_value = "incremental")]
        mode: TrainingMode,

        /// Weight initialization (uniform, simplex)
        #[arg(long, default_value = "uniform")]
        init: InitPolicy,

        /// SOM variant (standard, dot)
        #[arg(long, default_value = "standard")]
        variant: Variant,

        /// Wrap grid distances around the edges
        #[arg(long)]
        toroidal: bool,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show snapshot statistics
    Info {
        /// Snapshot file to inspect
        snapshot: PathBuf,
    },

    /// Print the winning unit of every input row
    Transform {
        /// Snapshot file to use
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Input data file
        #[arg(short, long)]
        input: PathBuf,

        /// Print grid coordinates instead of flat indices
        #[arg(short, long)]
        coords: bool,
    },

    /// Label the units of a lattice from labelled data (label in the last column)
    Calibrate {
        /// Snapshot file to calibrate
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Labelled input data file
        #[arg(short, long)]
        input: PathBuf,

        /// Output snapshot file (default: overwrite the input snapshot)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict a label for every input row with a calibrated lattice
    Predict {
        /// Calibrated snapshot file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Input data file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train {
            input,
            output,
            dx,
            dy,
            eta,
            radius,
            iterations,
            metric,
            mode,
            init,
            variant,
            toroidal,
            seed,
        } => {
            let config = SomConfig {
                dx,
                dy,
                dw: 0,
                learning_rate: eta,
                radius,
                iterations,
                metric,
                mode,
                init,
                variant,
                toroidal,
                seed,
                ..Default::default()
            };
            train_lattice(input, output, config)
        }

        Commands::Info { snapshot } => show_info(snapshot),

        Commands::Transform {
            snapshot,
            input,
            coords,
        } => transform(snapshot, input, coords),

        Commands::Calibrate {
            snapshot,
            input,
            output,
        } => calibrate(snapshot, input, output),

        Commands::Predict { snapshot, input } => predict(snapshot, input),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn train_lattice(input: PathBuf, output: PathBuf, mut config: SomConfig) -> Result<()> {
    let start_time = Instant::now();

    println!("Kohonen Self-Organizing Map Engine");
    println!("   Training lattice from: {}", input.display());
    println!();

    let data = read_matrix(&input)?;
    config.dw = data.ncols();
    println!(
        "✓ Loaded {} samples of dimension {}",
        format_number(data.nrows()),
        data.ncols()
    );

    let mut som: Som = Som::new(&config)?;
    println!(
        "✓ Initialized {}x{} lattice ({} init, {} variant, {} mode)",
        config.dx, config.dy, config.init, config.variant, config.mode
    );

    let bar_style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        .map_err(|e| KohonenError::Configuration(e.to_string()))?
        .progress_chars("█▓▒░  ");

    let pb = ProgressBar::new(config.iterations as u64);
    pb.set_style(bar_style);
    pb.set_message("Training...");

    som.fit_with(data.view(), |report| {
        pb.set_message(format!(
            "Training... radius={:.3} qe={:.6}",
            report.radius, report.quantization_error
        ));
        pb.inc(1);
    })?;

    pb.finish_and_clear();
    println!(
        "✓ Trained {} iterations, final quantization error {:.6}",
        config.iterations,
        som.quantization_error().last().copied().unwrap_or_default()
    );

    som.save(&output)?;
    println!("✓ Saved snapshot to {}", output.display());
    println!();
    println!("Done in {}", HumanDuration(start_time.elapsed()));
    Ok(())
}

fn show_info(snapshot: PathBuf) -> Result<()> {
    let som: Som = Som::load(&snapshot)?;
    let config = som.config();
    let (dx, dy, dw) = som.dims();

    println!("Snapshot: {}", snapshot.display());
    println!("  Lattice:        {} x {} x {}", dx, dy, dw);
    println!("  Variant:        {}", config.variant);
    println!("  Mode:           {}", config.mode);
    println!("  Metric:         {}", config.metric);
    println!("  Iterations:     {}", som.quantization_error().len());

    if let (Some(first), Some(last)) = (
        som.quantization_error().first(),
        som.quantization_error().last(),
    ) {
        println!("  Quant. error:   {:.6} -> {:.6}", first, last);
    }

    let histogram = som.winner_histogram();
    let used = histogram.iter().filter(|&&c| c > 0).count();
    println!(
        "  Winners:        {} total, {}/{} units used",
        format_number(histogram.sum() as usize),
        used,
        som.total_units()
    );

    let umatrix = som.umatrix();
    let (lo, hi) = umatrix
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    println!("  U-matrix:       [{:.4}, {:.4}]", lo, hi);
    println!(
        "  Calibrated:     {}",
        if som.is_calibrated() { "yes" } else { "no" }
    );
    Ok(())
}

fn transform(snapshot: PathBuf, input: PathBuf, coords: bool) -> Result<()> {
    let som: Som = Som::load(&snapshot)?;
    let data = read_matrix(&input)?;

    if coords {
        for (x, y) in som.transform_coords(data.view())? {
            println!("{},{}", x, y);
        }
    } else {
        for index in som.transform(data.view())? {
            println!("{}", index);
        }
    }
    Ok(())
}

fn calibrate(snapshot: PathBuf, input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut som: Som = Som::load(&snapshot)?;
    let (data, labels) = read_labelled(&input)?;

    som.calibrate(data.view(), &labels)?;

    let output = output.unwrap_or(snapshot);
    som.save(&output)?;
    println!(
        "✓ Calibrated {} units from {} samples, saved to {}",
        som.total_units(),
        format_number(data.nrows()),
        output.display()
    );
    Ok(())
}

fn predict(snapshot: PathBuf, input: PathBuf) -> Result<()> {
    let som: Som = Som::load(&snapshot)?;
    let data = read_matrix(&input)?;

    for label in som.predict(data.view())? {
        println!("{}", label);
    }
    Ok(())
}

/// Reads a numeric matrix, one row per non-empty line. `#` starts a comment line.
fn read_matrix(path: &Path) -> Result<Array2<f64>> {
    let rows = read_rows(path)?
        .into_iter()
        .map(|(line_no, fields)| parse_fields(path, line_no, &fields))
        .collect::<Result<Vec<_>>>()?;
    to_matrix(path, rows)
}

/// Reads a matrix whose last column is a label.
fn read_labelled(path: &Path) -> Result<(Array2<f64>, Vec<String>)> {
    let mut rows = Vec::new();
    let mut labels = Vec::new();

    for (line_no, mut fields) in read_rows(path)? {
        let label = fields.pop().ok_or_else(|| {
            KohonenError::Shape(format!("{}:{}: missing label", path.display(), line_no))
        })?;
        rows.push(parse_fields(path, line_no, &fields)?);
        labels.push(label);
    }
    Ok((to_matrix(path, rows)?, labels))
}

fn read_rows(path: &Path) -> Result<Vec<(usize, Vec<String>)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        rows.push((i + 1, fields));
    }
    Ok(rows)
}

fn parse_fields(path: &Path, line_no: usize, fields: &[String]) -> Result<Vec<f64>> {
    fields
        .iter()
        .map(|f| {
            f.parse::<f64>().map_err(|_| {
                KohonenError::Shape(format!(
                    "{}:{}: '{}' is not a number",
                    path.display(),
                    line_no,
                    f
                ))
            })
        })
        .collect()
}

fn to_matrix(path: &Path, rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map(Vec::len).unwrap_or(0);

    if n_rows == 0 || n_cols == 0 {
        return Err(KohonenError::Shape(format!("{}: no data", path.display())));
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
        return Err(KohonenError::Shape(format!(
            "{}: row {} has {} columns, expected {}",
            path.display(),
            bad + 1,
            rows[bad].len(),
            n_cols
        )));
    }

    Ok(Array2::from_shape_vec((n_rows, n_cols), rows.concat())?)
}

fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
