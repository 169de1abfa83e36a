//! CLI argument surface.

use clap::Parser;
use tracing::Level;

use crate::commands::Command;

/// Consistent-hashing algorithm workbench.
#[derive(Debug, Parser)]
#[command(name = "chash", version, about)]
pub struct CliConfig {
    /// Log level: error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "warn")]
    pub log: Level,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(self.log)
            .with_target(false)
            .init();
        self.command.run()
    }
}
