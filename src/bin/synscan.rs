use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use synscan::config::ConfigLoader;
use synscan::entrez::EntrezHttpClient;
use synscan::error::ScanError;
use synscan::pipeline::Pipeline;
use synscan::table;
use synscan::uniprot::UniprotHttpClient;

#[derive(Parser)]
#[command(name = "synscan")]
#[command(about = "Resolve protein accessions to their genomic neighbourhood and measure marker-gene synteny distances")]
#[command(version, author)]
struct Cli {
    /// Identifier list: one UniProt accession per line, no header
    #[arg(long, short = 'i')]
    input: Utf8PathBuf,

    /// Report path (TSV); doubles as the checkpoint file
    #[arg(long, short = 'o')]
    output: Utf8PathBuf,

    /// Optional JSON config file (defaults to ./synscan.json when present)
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Marker gene panel, comma separated; overrides the config file
    #[arg(long, value_delimiter = ',')]
    markers: Option<Vec<String>>,

    /// Identifiers per checkpoint batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Politeness pause between external calls, in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(scan) = report.downcast_ref::<ScanError>() {
            return ExitCode::from(map_exit_code(scan));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ScanError) -> u8 {
    match error {
        ScanError::InputRead(_)
        | ScanError::ConfigRead(_)
        | ScanError::ConfigParse(_)
        | ScanError::InvalidAccession(_) => 2,
        ScanError::UniprotHttp(_)
        | ScanError::UniprotStatus { .. }
        | ScanError::EntrezHttp(_)
        | ScanError::EntrezStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;
    if let Some(markers) = cli.markers {
        settings.markers = markers;
    }
    if let Some(batch_size) = cli.batch_size {
        settings.batch_size = batch_size.max(1);
    }
    if let Some(pause_ms) = cli.pause_ms {
        settings.pause = Duration::from_millis(pause_ms);
    }

    let queries = table::read_identifiers(&cli.input).into_diagnostic()?;
    tracing::info!(
        identifiers = queries.len(),
        markers = settings.markers.len(),
        "starting scan"
    );

    let uniprot = UniprotHttpClient::new().into_diagnostic()?;
    let entrez = EntrezHttpClient::new().into_diagnostic()?;
    let pipeline = Pipeline::new(uniprot, entrez, settings);

    let markers = pipeline.settings().markers.clone();
    let output = cli.output.clone();
    let rows = pipeline
        .run(&queries, &mut |rows| table::write_table(&output, &markers, rows))
        .into_diagnostic()?;

    let failed = rows.iter().filter(|row| !row.note.is_empty()).count();
    println!(
        "{} identifiers processed ({} unresolved); report at {}",
        rows.len(),
        failed,
        cli.output
    );
    Ok(())
}
