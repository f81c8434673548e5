use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use hftrigger::config::FilterConfig;
use hftrigger::error::TrResult;
use std::process;
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base configuration (JSON). Flags given on the command line override it.
    #[arg(global = true, long = "config-file")]
    config_file: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run(cmd::run::RunArgs),
    Config(cmd::config::ConfigArgs),
}

fn resolve_config(cli_config: &FilterConfig, file: &Option<String>, sub_matches: &clap::ArgMatches) -> TrResult<FilterConfig> {
    let Some(path) = file else {
        return Ok(cli_config.clone());
    };

    println!("📂 Loading Configuration from: {}", path);
    let mut config = FilterConfig::load_from_file(path)?;
    config.merge_from_cli(cli_config, sub_matches);
    Ok(config)
}

fn main() {
    // Raw matches tell explicit flags apart from defaults
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let (cli_config, sub_name) = match &cli.command {
        Commands::Run(args) => (&args.config, "run"),
        Commands::Config(args) => (&args.config, "config"),
    };
    let Some(sub_matches) = matches.subcommand_matches(sub_name) else {
        eprintln!("❌ Missing subcommand arguments for '{}'", sub_name);
        process::exit(2);
    };

    let config = resolve_config(cli_config, &cli.config_file, sub_matches).unwrap_or_else(|e| {
        eprintln!("\n❌ FATAL ERROR LOADING CONFIGURATION:");
        eprintln!("   {}", e);
        process::exit(1);
    });

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(args, config),
        Commands::Config(_) => cmd::config::run(&config),
    };

    if let Err(e) = result {
        eprintln!("\n❌ FATAL ERROR:");
        eprintln!("   {}", e);
        process::exit(1);
    }
}
