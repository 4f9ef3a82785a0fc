mod cmd;
mod output;
mod session;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use session::{GlobalOpts, Session};
use std::path::PathBuf;
use xpai_core::config::Config;
use xpai_core::types::OutputFormat;

#[derive(Parser)]
#[command(
    name = "crossplane-ai",
    about = "Query, analyze, and generate Crossplane resources with natural language",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./.crossplane-ai.yaml, then ~/.crossplane-ai.yaml)
    #[arg(long, global = true, env = "CROSSPLANE_AI_CONFIG")]
    config: Option<PathBuf>,

    /// Kubeconfig file (default: $KUBECONFIG or ~/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Use the embedded sample cluster and template answers
    #[arg(long, global = true)]
    mock: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Output format: table, json, or yaml (default from config)
    #[arg(long, short = 'o', global = true)]
    output: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about your resources (no question starts interactive mode)
    Ask {
        /// The question, e.g. "what AWS resources do I have?"
        text: Vec<String>,
        /// Only consider resources from this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,
        /// Only consider resources in this namespace
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },

    /// Analyze resource health and get recommendations
    Analyze {
        /// Analyze a single resource by name
        name: Option<String>,
        #[arg(long, short = 'p')]
        provider: Option<String>,
        #[arg(long, short = 'n')]
        namespace: Option<String>,
        /// Also report resources without a readiness condition
        #[arg(long, short = 'H')]
        health_check: bool,
        /// Counts and score only
        #[arg(long, short = 's')]
        summary: bool,
    },

    /// Get suggestions for a category (database, security, optimize, network, general)
    Suggest {
        category: Option<String>,
        #[arg(long, short = 'p')]
        provider: Option<String>,
        /// Include category and examples
        #[arg(long, short = 'd')]
        detailed: bool,
        /// Maximum number of suggestions
        #[arg(long, short = 'l', default_value = "5")]
        limit: usize,
    },

    /// Generate a manifest from a description
    Generate {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Target provider: aws, gcp, azure, or auto
        #[arg(long, short = 'p', default_value = "auto")]
        provider: String,
    },

    /// Start an interactive session
    #[command(alias = "i", alias = "chat")]
    Interactive {
        /// Show the banner on startup
        #[arg(long, short = 'b')]
        banner: bool,
        /// Run a quick analysis before the first prompt
        #[arg(long, short = 'a')]
        analyze: bool,
    },

    /// Serve the tools over MCP (JSON-RPC 2.0 on stdin/stdout)
    Mcp,

    /// Write or list example manifests
    Examples {
        /// Directory to write into
        #[arg(long, default_value = "examples")]
        dir: PathBuf,
        /// List available examples without writing files
        #[arg(long)]
        list: bool,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();
    // `config init` must work before any config file exists.
    let config = match &cli.command {
        Commands::Config {
            subcommand: ConfigSubcommand::Init { .. },
        } => Ok(Config::default()),
        _ => Config::load(cli.config.as_deref()),
    };

    let verbose = cli.verbose || config.as_ref().map(|c| c.cli.verbose).unwrap_or(false);
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if verbose {
        for target in ["crossplane_ai", "xpai_core", "openai_chat"] {
            if let Ok(directive) = format!("{target}=debug").parse() {
                filter = filter.add_directive(directive);
            }
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match config {
        Ok(config) => run(cli, config),
        Err(e) => Err(anyhow::Error::new(e).context("failed to load config")),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let opts = GlobalOpts {
        kubeconfig: cli.kubeconfig,
        context: cli.context,
        mock: cli.mock,
        output: cli.output,
    };
    let output = opts.output.unwrap_or(config.cli.output_format);

    match cli.command {
        Commands::Examples { dir, list } => cmd::examples::run(&dir, list, output),
        Commands::Config { subcommand } => {
            cmd::config::run(subcommand, &config, cli.config.as_deref(), output)
        }
        Commands::Ask {
            text,
            provider,
            namespace,
        } => {
            let mut session = Session::new(&opts, config)?;
            cmd::ask::run(&mut session, &text, provider, namespace)
        }
        Commands::Analyze {
            name,
            provider,
            namespace,
            health_check,
            summary,
        } => {
            let mut session = Session::new(&opts, config)?;
            let filter = session.filter(name, provider, namespace);
            cmd::analyze::run(&mut session, &filter, health_check, summary)
        }
        Commands::Suggest {
            category,
            provider,
            detailed,
            limit,
        } => {
            let mut session = Session::new(&opts, config)?;
            let category = category.unwrap_or_else(|| "general".to_string());
            cmd::suggest::run(&mut session, &category, provider, detailed, limit)
        }
        Commands::Generate {
            description,
            provider,
        } => {
            let session = Session::new(&opts, config)?;
            cmd::generate::run(&session, &description.join(" "), &provider)
        }
        Commands::Interactive { banner, analyze } => {
            let mut session = Session::new(&opts, config)?;
            cmd::interactive::run(&mut session, banner, analyze)
        }
        Commands::Mcp => {
            let mut session = Session::new(&opts, config)?;
            cmd::mcp::run(&mut session)
        }
    }
}
