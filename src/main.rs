use anyhow::{Context, Result};
use clap::Parser;
use libbillsplit::{parse_bill_file, parse_description_file, parse_mapping_file, SplitOptions};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "billsplit")]
#[command(about = "Split a paid bill across the people who shared it", long_about = None)]
struct Cli {
    /// Reads `<BASE>.bill` and `<BASE>.expenses`
    base: PathBuf,

    /// Person to account mapping, skipped when missing
    #[arg(long, default_value = "beannames.txt")]
    beannames: PathBuf,

    /// Lowest accepted similarity between item names, 0 to 1
    #[arg(long)]
    threshold: Option<String>,

    /// levenshtein, jaro-winkler or sorensen-dice
    #[arg(long)]
    metric: Option<String>,

    #[arg(long)]
    sampler_prefix: Option<String>,

    /// Picks who absorbs the rounding discrepancy, defaults to the bill path
    #[arg(long)]
    run_id: Option<String>,

    #[arg(long)]
    currency: Option<String>,

    /// Posting date, YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    title: Option<String>,

    /// Only print the report
    #[arg(long, default_value_t = false)]
    no_postings: bool,
}

impl Cli {
    fn overrides(&self) -> Vec<(&'static str, &str)> {
        [
            ("similarity-threshold", &self.threshold),
            ("metric", &self.metric),
            ("sampler-prefix", &self.sampler_prefix),
            ("run-id", &self.run_id),
            ("currency", &self.currency),
            ("date", &self.date),
            ("title", &self.title),
        ]
        .into_iter()
        .filter_map(|(key, val)| val.as_deref().map(|val| (key, val)))
        .collect()
    }
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(ext);
    PathBuf::from(path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("billsplit=info,libbillsplit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let bill_path = with_extension(&cli.base, "bill");
    let description_path = with_extension(&cli.base, "expenses");

    let bill = parse_bill_file(&bill_path)
        .with_context(|| format!("reading bill {}", bill_path.display()))?;
    let description = parse_description_file(&description_path)
        .with_context(|| format!("reading description {}", description_path.display()))?;

    let mut options = SplitOptions {
        run_id: bill_path.display().to_string(),
        ..Default::default()
    };
    options.apply_options(description.options())?;
    for (key, val) in cli.overrides() {
        options.set_option(key, val)?;
    }
    debug!("options: {:?}", options);

    let split = libbillsplit::split(&bill, &description, &options)?;
    print!("{}", split);

    if cli.no_postings {
        return Ok(());
    }

    let mut posting = description.posting().clone();
    if cli.beannames.exists() {
        posting.merge(
            &parse_mapping_file(&cli.beannames)
                .with_context(|| format!("reading mapping {}", cli.beannames.display()))?,
        );
    } else {
        info!("{} not found, skipping account mapping", cli.beannames.display());
    }

    println!();
    print!("{}", posting.render(split.rounded(), split.paid(), &options)?);
    Ok(())
}
