use anyhow::{Context, Result};
use clap::Parser;
use readytime::aggregate::{AggregationConfig, BundleAggregator};
use readytime::cli::{Cli, OutputFormat};
use readytime::csv_output::CsvOutput;
use readytime::filter::{available_sources, SourceSelection};
use readytime::json_output::JsonReport;
use readytime::view::{available_device_types, compare_devices, BundleSet, DeviceFilter};
use readytime::{bundle, text_output};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file (or defaults) with CLI overrides applied
fn load_config(args: &Cli) -> Result<AggregationConfig> {
    let mut config = match &args.config {
        Some(path) => AggregationConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AggregationConfig::default(),
    };
    if let Some(ceiling) = args.ceiling {
        config.outlier_ceiling_secs = ceiling;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = load_config(&args)?;
    let bundles = bundle::load_bundles(&args.file)?;
    tracing::debug!("Loaded {} bundles from {}", bundles.len(), args.file.display());

    if args.list_sources {
        for source in available_sources(&bundles, &config.category_checkpoint) {
            println!("{}", source);
        }
        return Ok(());
    }

    let selection = match &args.source {
        Some(expr) => SourceSelection::from_expr(expr),
        None => SourceSelection::all(),
    };
    let bundles = selection.apply(bundles, &config.category_checkpoint);

    let rule = args.group_by.rule(&config.category_checkpoint);
    let aggregator = BundleAggregator::new(&config)?;
    let mut set = BundleSet::new(bundles, aggregator);

    if args.list_devices {
        for device in available_device_types(&mut set) {
            println!("{}", device);
        }
        return Ok(());
    }

    let primary = DeviceFilter::from_label(args.device.as_deref().unwrap_or_default());
    let compare = args.compare.as_deref().map(DeviceFilter::from_label);
    if compare.as_ref() == Some(&primary) {
        tracing::warn!("Ignoring --compare {}: same as the primary device", primary.label());
    }

    let comparison = compare_devices(&mut set, &primary, compare.as_ref(), &rule);

    match args.format {
        OutputFormat::Text => {
            print!(
                "{}",
                text_output::render_report(&comparison, args.group_by.dimension(), args.percentile)
            );
        }
        OutputFormat::Json => {
            let report = JsonReport::new(&comparison, &rule.to_string(), args.percentile);
            println!("{}", report.to_json()?);
        }
        OutputFormat::Csv => {
            print!("{}", CsvOutput::from_aggregation(&comparison.primary.breakdown).to_csv());
        }
    }

    Ok(())
}
