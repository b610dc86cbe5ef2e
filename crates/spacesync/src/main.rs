use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use spacesync::RenderStage;

#[derive(Parser)]
#[command(name = "spacesync")]
#[command(about = "Render YAML content trees into markup for a remote document space")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single resource and print the selected stage
    Render {
        /// Resource file inside spaces/<SPACE_KEY>/
        file: PathBuf,

        /// Stage to print
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Mst)]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Structured data after the structural hooks
    Yaml,
    /// JSON projection after the projection hooks
    Json,
    /// Final markup
    Mst,
}

impl From<OutputFormat> for RenderStage {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => RenderStage::Structural,
            OutputFormat::Json => RenderStage::Projection,
            OutputFormat::Mst => RenderStage::Markup,
        }
    }
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Render { file, output } => match spacesync::render_file(&file, output.into()) {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}
