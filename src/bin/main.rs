//! osvm Command Line Interface
//!
//! Train online kernel machines on CSV data, predict with stored models
//! and ensembles, and inspect model files.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use osvm::core::{LearningParams, LearningRateSchedule, Result, SVMError, Task};
use osvm::kernel::{GaussianKernel, Kernel, KernelFunction, KernelRegistry};
use osvm::optimizer::{train_partitioned, train_task};
use osvm::persistence::ModelFile;
use osvm::predict::{predict_ensemble, predict_single};
use osvm::{CSVDataset, Dataset};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "osvm")]
#[command(about = "Online kernel machines: regression, classification and novelty detection")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "osvm contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model or ensemble
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Learning task
    #[arg(short, long)]
    task: CliTask,

    /// Training data file (CSV)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Kernel function
    #[arg(short, long, default_value = "dot")]
    kernel: CliKernel,

    /// Degree of the polynomial kernel
    #[arg(long, default_value = "2")]
    degree: u32,

    /// Width of the Gaussian kernel (defaults to 1 / number of features)
    #[arg(long)]
    gamma: Option<f64>,

    /// Learning rate
    #[arg(long, default_value = "0.1")]
    eta: f64,

    /// Target fraction of margin errors
    #[arg(long, default_value = "0.005")]
    nu: f64,

    /// Offset step fraction (regression only)
    #[arg(long, default_value = "0.2")]
    slambda: f64,

    /// Learning-rate schedule
    #[arg(long, default_value = "constant")]
    schedule: CliSchedule,

    /// Number of independently trained models
    #[arg(short, long, default_value = "1")]
    partitions: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliTask {
    #[value(name = "regression")]
    Regression,
    #[value(name = "classification")]
    Classification,
    #[value(name = "novelty", alias = "novelty-detection")]
    Novelty,
}

impl From<CliTask> for Task {
    fn from(cli_task: CliTask) -> Self {
        match cli_task {
            CliTask::Regression => Task::Regression,
            CliTask::Classification => Task::Classification,
            CliTask::Novelty => Task::NoveltyDetection,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// K(x, y) = x · y
    #[value(name = "dot")]
    Dot,
    /// K(x, y) = (x · y)^degree
    #[value(name = "polynomial")]
    Polynomial,
    /// K(x, y) = exp(-gamma * ||x - y||²)
    #[value(name = "gaussian")]
    Gaussian,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliSchedule {
    /// Fixed learning rate
    #[value(name = "constant")]
    Constant,
    /// eta / sqrt(t)
    #[value(name = "inverse-sqrt")]
    InverseSqrt,
}

impl From<CliSchedule> for LearningRateSchedule {
    fn from(cli_schedule: CliSchedule) -> Self {
        match cli_schedule {
            CliSchedule::Constant => LearningRateSchedule::Constant,
            CliSchedule::InverseSqrt => LearningRateSchedule::InverseSqrt,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (CSV)
    #[arg(long)]
    data: PathBuf,

    /// Read every column as a feature
    #[arg(long)]
    unlabeled: bool,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn build_kernel(args: &TrainArgs, n_features: usize) -> Result<KernelFunction> {
    match args.kernel {
        CliKernel::Dot => Ok(KernelFunction::dot()),
        CliKernel::Polynomial => KernelFunction::polynomial(args.degree),
        CliKernel::Gaussian => match args.gamma {
            Some(gamma) => KernelFunction::gaussian(gamma),
            None => Ok(KernelFunction::Gaussian(GaussianKernel::with_auto_gamma(
                n_features,
            )?)),
        },
    }
}

fn learning_params(args: &TrainArgs) -> LearningParams {
    LearningParams {
        eta: args.eta,
        nu: args.nu,
        slambda: args.slambda,
        schedule: args.schedule.into(),
    }
}

fn load_dataset(path: &Path, unlabeled: bool) -> Result<CSVDataset> {
    if unlabeled {
        CSVDataset::from_file_unlabeled(path)
    } else {
        CSVDataset::from_file(path)
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    let task = Task::from(args.task);
    let params = learning_params(&args);
    params.validate(task)?;

    info!("Training {task} model...");
    info!("Data file: {:?}", args.data);

    let dataset = load_dataset(&args.data, task == Task::NoveltyDetection)?;
    info!(
        "Loaded {} samples with {} dimensions",
        dataset.len(),
        dataset.dim()
    );

    let kernel = build_kernel(&args, dataset.dim())?;
    info!(
        "Parameters: kernel={}, eta={}, nu={}, slambda={}, schedule={:?}",
        kernel.spec(),
        params.eta,
        params.nu,
        params.slambda,
        params.schedule
    );

    let models = if args.partitions == 1 {
        vec![train_task(task, &dataset.samples(), &kernel, params)?]
    } else {
        info!("Training {} models in parallel", args.partitions);
        train_partitioned(dataset.samples(), args.partitions, |part| {
            train_task(task, part, &kernel, params)
        })?
        .into_models()
    };

    info!("Training completed successfully");
    for (i, model) in models.iter().enumerate() {
        info!(
            "Model {i}: {} support vectors out of {} observations",
            model.n_support_vectors(),
            model.observation_count()
        );
    }

    let file = ModelFile::from_models(&models, params)?;
    file.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let file = ModelFile::load_from_file(&args.model)?;
    let kernel = file.kernel_function(&KernelRegistry::new())?;
    let models = file.to_models()?;

    let unlabeled = args.unlabeled || file.task == Task::NoveltyDetection;
    if args.unlabeled && file.task != Task::NoveltyDetection {
        warn!("Reading labelled {} data without labels", file.task);
    }

    info!("Loading prediction data from: {:?}", args.data);
    let dataset = load_dataset(&args.data, unlabeled)?;
    let rows = dataset.features();

    let mut lines = Vec::with_capacity(rows.len());
    for (i, x) in rows.iter().enumerate() {
        let line = if models.len() == 1 {
            format!("{i} {:.6}", predict_single(&models[0], x, &kernel)?)
        } else {
            let entries = predict_ensemble(&models, x, &kernel)?;
            let values: Vec<String> = entries
                .iter()
                .map(|(label, value)| format!("{label}={value:.6}"))
                .collect();
            format!("{i} {}", values.join(" "))
        };
        lines.push(line);
    }

    match args.output {
        Some(output_path) => {
            let out = File::create(&output_path).map_err(SVMError::IoError)?;
            write_predictions(BufWriter::new(out), &lines)?;
            info!("Predictions saved to: {output_path:?}");
        }
        None => write_predictions(io::stdout().lock(), &lines)?,
    }

    Ok(())
}

fn write_predictions<W: Write>(mut writer: W, lines: &[String]) -> Result<()> {
    writeln!(writer, "# Predictions for {} samples", lines.len())?;
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let file = ModelFile::load_from_file(&args.model)?;
    file.print_summary();
    Ok(())
}
