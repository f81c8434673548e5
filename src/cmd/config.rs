use clap::Args;
use hftrigger::config::FilterConfig;
use hftrigger::error::TrResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub config: FilterConfig,
}

/// Print the effective configuration, after checking that it resolves.
pub fn run(config: &FilterConfig) -> TrResult<()> {
    config.validate()?;
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
