use clap::{Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use veneer_driver::{bind_method, Driver, ExtractionStrategy, VeneerConfig};

#[derive(Parser)]
#[command(name = "veneer")]
#[command(author, version, about = "Generate TypeScript bindings from Objective-C headers")]
struct Cli {
    /// Log progress (`info`); RUST_LOG takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one TypeScript module per class
    Generate {
        /// Header files or directories to scan for `.h` files
        inputs: Vec<PathBuf>,

        /// Declarations passed directly instead of a file
        #[arg(long)]
        source: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        extract: ExtractArgs,
    },

    /// Parse a single method declaration and print its binding
    Method {
        /// e.g. "- (void)setTitle:(NSString *)title;"
        decl: String,
    },

    /// Print the extracted class model of a header
    Dump {
        /// Header file to dump
        header: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,
    },
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Configuration file (default: ./veneer.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extraction front-end: `text` or `clang`
    #[arg(long)]
    strategy: Option<ExtractionStrategy>,

    /// Directory containing libclang
    #[arg(long)]
    libclang: Option<PathBuf>,

    /// SDK root passed to clang as -isysroot
    #[arg(long)]
    sdk: Option<PathBuf>,
}

impl ExtractArgs {
    /// The configuration file with command-line overrides applied.
    fn load(&self) -> Result<VeneerConfig> {
        let mut config = match &self.config {
            Some(path) => VeneerConfig::from_file(path)?,
            None => VeneerConfig::discover(Path::new("."))?,
        };
        if let Some(strategy) = self.strategy {
            config.extract.strategy = strategy;
        }
        if let Some(libclang) = &self.libclang {
            config.extract.libclang_path = Some(libclang.clone());
        }
        if let Some(sdk) = &self.sdk {
            config.extract.sdk_root = Some(sdk.clone());
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            inputs,
            source,
            output,
            extract,
        } => {
            if inputs.is_empty() && source.is_none() {
                return Err(miette::miette!(
                    help = "pass header paths or --source",
                    "nothing to generate"
                ));
            }

            let mut config = extract.load()?;
            if let Some(output) = output {
                config.output.dir = output;
            }

            let driver = Driver::new(config);
            let summary = driver.run(&inputs, source.as_deref())?;
            println!("{}", summary);
        }

        Commands::Method { decl } => {
            let binding = bind_method(&decl)?;
            println!("{:#?}", binding.method);
            println!();
            print!("{}", binding.typescript);
        }

        Commands::Dump { header, extract } => {
            let driver = Driver::new(extract.load()?);
            let classes = driver.extract(&[header], None)?;
            println!("{:#?}", classes);
        }
    }

    Ok(())
}
