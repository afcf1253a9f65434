use clap::Parser;
use std::path::PathBuf;

/// Navis - command interpretation and workflow orchestration for chart
/// dashboards
#[derive(Parser, Debug, Clone)]
#[command(name = "navis", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "NAVIS_CONFIG", default_value = "navis.toml")]
    pub config: PathBuf,

    /// Symbol seeded into the session context
    #[arg(short, long, env = "NAVIS_SYMBOL", default_value = "AAPL")]
    pub symbol: String,

    /// Print the parsed action plan without dispatching it
    #[arg(long)]
    pub parse_only: bool,

    /// Free-text chart command; omit to print agent status
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// The command words joined back into one string, if any were given
    pub fn command_text(&self) -> Option<String> {
        if self.command.is_empty() {
            None
        } else {
            Some(self.command.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["navis"]);
        assert_eq!(cli.config, PathBuf::from("navis.toml"));
        assert_eq!(cli.symbol, "AAPL");
        assert!(!cli.parse_only);
        assert!(cli.command_text().is_none());
    }

    #[test]
    fn test_cli_with_args() {
        let cli = Cli::parse_from([
            "navis",
            "--config",
            "custom.toml",
            "--symbol",
            "TSLA",
            "--parse-only",
            "switch",
            "to",
            "5m",
        ]);
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(cli.symbol, "TSLA");
        assert!(cli.parse_only);
        assert_eq!(cli.command_text().as_deref(), Some("switch to 5m"));
    }
}
