use anyhow::{Context, Result, ensure};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{ItemId, MovieLensPaths, RatingSplit, UserId, ensure_movielens, load_split};
use factorization::{DeviceConfig, NetworkKind, TrainConfig, TrainReport, Trainer};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// mf-recs - Matrix factorization rating prediction
#[derive(Parser)]
#[command(name = "mf-recs")]
#[command(about = "Train matrix factorization models on MovieLens 100k", long_about = None)]
struct Cli {
    /// Directory holding (or receiving) the ml-100k dataset
    #[arg(short = 'd', long = "data-root", global = true, default_value = "data")]
    data_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and unpack MovieLens 100k if it is not present
    Download,

    /// Show counts and id ranges of the train/test split
    Stats,

    /// Train a network on u1.base and evaluate it on u1.test
    Train {
        #[command(flatten)]
        args: TrainArgs,

        /// Write the per-epoch report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Train a network, then predict the score of one user/item pair
    Predict {
        #[command(flatten)]
        args: TrainArgs,

        #[arg(long)]
        user: UserId,

        #[arg(long)]
        item: ItemId,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NetworkArg {
    /// Embedding dot product
    Plain,
    /// One hidden layer per side
    Mlp,
    /// One hidden layer per side with dropout
    DropoutMlp,
}

/// Training settings; flags override values read from `--config`
#[derive(Args)]
struct TrainArgs {
    /// JSON file with a full or partial training config
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    network: Option<NetworkArg>,

    /// Width of the hidden layer (mlp networks)
    #[arg(long)]
    hidden: Option<usize>,

    /// Embedding width
    #[arg(long)]
    k: Option<usize>,

    /// Dropout probability (dropout-mlp)
    #[arg(long)]
    dropout: Option<f32>,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    epochs: Option<usize>,

    #[arg(long)]
    lr: Option<f64>,

    #[arg(long)]
    momentum: Option<f64>,

    /// Weight decay
    #[arg(long)]
    wd: Option<f64>,

    /// Batches between speed reports
    #[arg(long)]
    log_frequency: Option<usize>,

    /// Seed of the shuffle order
    #[arg(long)]
    seed: Option<u64>,

    /// Train on this CUDA device instead of the CPU
    #[arg(long)]
    cuda: Option<usize>,
}

impl TrainArgs {
    fn resolve(&self) -> Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => TrainConfig::from_json_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => TrainConfig::default(),
        };

        config.network = self.network_kind(config.network);
        if let Some(batch_size) = self.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(epochs) = self.epochs {
            config = config.with_num_epoch(epochs);
        }
        if let Some(lr) = self.lr {
            config = config.with_learning_rate(lr);
        }
        if let Some(momentum) = self.momentum {
            config = config.with_momentum(momentum);
        }
        if let Some(wd) = self.wd {
            config = config.with_weight_decay(wd);
        }
        if let Some(frequency) = self.log_frequency {
            config = config.with_log_frequency(frequency);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ordinal) = self.cuda {
            config = config.with_device(DeviceConfig::Cuda(ordinal));
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `--network`, `--hidden`, `--k` and `--dropout` on top of `base`
    fn network_kind(&self, base: NetworkKind) -> NetworkKind {
        let (base_hidden, base_k, base_p) = match base {
            NetworkKind::Plain { k } => (k, k, None),
            NetworkKind::Mlp { hidden, k } => (hidden, k, None),
            NetworkKind::DropoutMlp { hidden, k, p } => (hidden, k, Some(p)),
        };
        let hidden = self.hidden.unwrap_or(base_hidden);
        let k = self.k.unwrap_or(base_k);
        let p = self.dropout.or(base_p).unwrap_or(factorization::networks::DEFAULT_DROPOUT);

        let arg = self.network.unwrap_or(match base {
            NetworkKind::Plain { .. } => NetworkArg::Plain,
            NetworkKind::Mlp { .. } => NetworkArg::Mlp,
            NetworkKind::DropoutMlp { .. } => NetworkArg::DropoutMlp,
        });
        match arg {
            NetworkArg::Plain => NetworkKind::Plain { k },
            NetworkArg::Mlp => NetworkKind::Mlp { hidden, k },
            NetworkArg::DropoutMlp => NetworkKind::DropoutMlp { hidden, k, p },
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Download => handle_download(&cli.data_root)?,
        Commands::Stats => handle_stats(&cli.data_root)?,
        Commands::Train { args, report } => {
            handle_train(&cli.data_root, &args, report.as_deref())?
        }
        Commands::Predict { args, user, item } => {
            handle_predict(&cli.data_root, &args, user, item)?
        }
    }

    Ok(())
}

fn handle_download(data_root: &Path) -> Result<()> {
    let paths = ensure_movielens(data_root).context("Failed to fetch MovieLens 100k")?;
    println!("{} Dataset ready in {}", "✓".green(), paths.dir.display());
    Ok(())
}

/// Fetch if needed, then load the train/test split
fn load(data_root: &Path, batch_size: usize) -> Result<RatingSplit> {
    let paths: MovieLensPaths =
        ensure_movielens(data_root).context("Failed to fetch MovieLens 100k")?;

    println!("Loading ratings from {}...", paths.dir.display());
    let start = Instant::now();
    let split = load_split(&paths, batch_size).context("Failed to load ratings")?;
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());
    Ok(split)
}

fn handle_stats(data_root: &Path) -> Result<()> {
    let split = load(data_root, TrainConfig::default().batch_size)?;

    let mean = |ratings: &[data_loader::Rating]| {
        if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.score as f64).sum::<f64>() / ratings.len() as f64
        }
    };

    println!("{}", "Dataset statistics:".bold().blue());
    println!("{}Train ratings: {}", "• ".green(), split.train.len());
    println!("{}Test ratings: {}", "• ".green(), split.test.len());
    println!("{}User rows: {}", "• ".cyan(), split.bounds.num_users);
    println!("{}Item rows: {}", "• ".cyan(), split.bounds.num_items);
    println!("{}Mean train score: {:.3}", "• ".cyan(), mean(split.train.ratings()));
    println!("{}Mean test score: {:.3}", "• ".cyan(), mean(split.test.ratings()));
    println!(
        "{}Train batches of {}: {}",
        "• ".cyan(),
        split.train.batch_size(),
        split.train.num_batches()
    );
    Ok(())
}

fn handle_train(data_root: &Path, args: &TrainArgs, report_path: Option<&Path>) -> Result<()> {
    let config = args.resolve()?;
    let mut split = load(data_root, config.batch_size)?;

    let trainer = Trainer::new(config)?;
    let model = trainer.build_model(split.bounds)?;
    let report = trainer
        .fit(&model, &mut split.train, Some(&split.test))
        .context("Training failed")?;

    print_report(model.name(), &report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("{} Report written to {}", "✓".green(), path.display());
    }
    Ok(())
}

fn handle_predict(data_root: &Path, args: &TrainArgs, user: UserId, item: ItemId) -> Result<()> {
    let config = args.resolve()?;
    let mut split = load(data_root, config.batch_size)?;
    ensure!(
        split.bounds.contains_user(user),
        "User {} not found (largest id is {})",
        user,
        split.bounds.num_users.saturating_sub(1)
    );
    ensure!(
        split.bounds.contains_item(item),
        "Item {} not found (largest id is {})",
        item,
        split.bounds.num_items.saturating_sub(1)
    );

    let trainer = Trainer::new(config)?;
    let model = trainer.build_model(split.bounds)?;
    let report = trainer.fit(&model, &mut split.train, Some(&split.test))?;
    print_report(model.name(), &report);

    let score = model.predict(&[user], &[item])?;
    let observed = split
        .train
        .ratings()
        .iter()
        .chain(split.test.ratings())
        .find(|r| r.user_id == user && r.item_id == item);

    println!(
        "{} user {} / item {}: {:.3}",
        "Predicted score".bold().blue(),
        user,
        item,
        score[0]
    );
    if let Some(rating) = observed {
        println!("{}Observed rating: {}", "• ".green(), rating.score);
    }
    Ok(())
}

/// Helper function to format and print a training report
fn print_report(network: &str, report: &TrainReport) {
    println!("{}", format!("Training report ({network}):").bold().blue());
    for epoch in &report.epochs {
        let fmt = |v: Option<f64>| {
            v.map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{:>3}. train rmse {}  validation rmse {}  ({:.2?})",
            epoch.epoch.to_string().green(),
            fmt(epoch.train_rmse),
            fmt(epoch.eval_rmse),
            epoch.elapsed
        );
    }
    if let Some(rmse) = report.final_eval_rmse() {
        println!("{}Final validation rmse: {:.4}", "• ".cyan(), rmse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_data_root_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["mf-recs", "train", "--data-root", "x", "--epochs", "1"])
            .unwrap();
        assert_eq!(cli.data_root, PathBuf::from("x"));
        assert!(matches!(cli.command, Commands::Train { .. }));

        let cli = Cli::try_parse_from(["mf-recs", "--data-root", "y", "stats"]).unwrap();
        assert_eq!(cli.data_root, PathBuf::from("y"));
    }

    #[test]
    fn test_data_root_defaults_to_data() {
        let cli = Cli::try_parse_from(["mf-recs", "download"]).unwrap();
        assert_eq!(cli.data_root, PathBuf::from("data"));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "mf-recs", "train", "--network", "dropout-mlp", "--hidden", "32", "--seed", "4",
        ])
        .unwrap();
        let Commands::Train { args, .. } = cli.command else {
            panic!("expected train");
        };
        let config = args.resolve().unwrap();
        assert_eq!(config.seed, Some(4));
        assert!(matches!(config.network, NetworkKind::DropoutMlp { hidden: 32, .. }));
    }
}
