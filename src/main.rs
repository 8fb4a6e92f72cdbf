use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use log::info;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use warming_stripes::{ChartFormat, PlottersSink, StripesConfig, WarmingStripes};

#[derive(Parser, Debug)]
#[command(author, version, about = "Warming stripes with projected RCP scenarios", long_about = None)]
struct Cli {
    /// JSON config file; missing fields take their defaults.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Directory the charts are written to.
    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    /// Output formats; repeat for several.
    #[arg(short, long = "format", value_enum, default_values_t = [FormatOpt::Svg, FormatOpt::Png])]
    formats: Vec<FormatOpt>,

    /// Cache directory for the downloaded series. Defaults to the system cache dir.
    #[arg(long, value_hint = ValueHint::DirPath)]
    cache_dir: Option<PathBuf>,

    /// Also write the projected values as CSV.
    #[arg(long, value_hint = ValueHint::FilePath)]
    csv: Option<PathBuf>,

    /// Override the config's data URL.
    #[arg(long)]
    data_url: Option<String>,

    /// Print the default config as JSON and exit.
    #[arg(long, action = ArgAction::SetTrue)]
    print_default_config: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Svg,
    Png,
}

impl From<FormatOpt> for ChartFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Svg => ChartFormat::Svg,
            FormatOpt::Png => ChartFormat::Png,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if cli.print_default_config {
        println!("{}", StripesConfig::default().to_json_string()?);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => StripesConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StripesConfig::default(),
    };
    if let Some(url) = cli.data_url {
        config.data_url = url;
    }

    let stripes = match cli.cache_dir {
        Some(dir) => WarmingStripes::with_cache_folder(config, dir).await?,
        None => WarmingStripes::new(config).await?,
    };

    let series = stripes
        .load_series()
        .await
        .with_context(|| format!("loading {}", stripes.config().data_url))?;
    info!(
        "Loaded {} years ({:?}..={:?})",
        series.len(),
        series.first_year(),
        series.last_year()
    );

    let composition = stripes.compose(&series)?;
    if let Some(csv) = &cli.csv {
        composition.write_csv(csv)?;
        info!("Wrote projection table to {}", csv.display());
    }

    let mut sinks: Vec<_> = cli
        .formats
        .iter()
        .map(|f| {
            PlottersSink::in_dir(
                &cli.output_dir,
                &stripes.config().output_stem,
                ChartFormat::from(*f),
            )
        })
        .collect();
    stripes.render_to(&composition, &mut sinks[..])?;
    for sink in &sinks {
        println!("{}", sink.path().display());
    }
    Ok(())
}
