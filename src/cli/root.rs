use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::config::Config;
use crate::tui;

/// Usher - Promise-style modal dialogs for your terminal
#[derive(Parser)]
#[command(
    name = "usher",
    version,
    about = "Promise-style modal dialogs for your terminal",
    long_about = r#"Usher hosts modal dialogs over a terminal UI: callers open a dialog and
await its outcome like a promise while the host handles rendering,
input routing, and teardown.

Running without arguments starts an interactive demo.

Examples:
  usher                    # Start the demo
  usher --theme light      # Light palette
  usher --no-mouse         # Disable mouse capture"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Theme name (dark or light)
    #[arg(long = "theme")]
    pub theme: Option<String>,

    /// Tick interval in milliseconds
    #[arg(long = "tick-rate")]
    pub tick_rate: Option<u64>,

    /// Disable mouse capture
    #[arg(long = "no-mouse")]
    pub no_mouse: bool,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("debug logging enabled");
        }

        let mut config = Config::init().await?;
        self.apply_to(&mut config);
        config.validate()?;
        debug!(?config, "configuration initialized");

        tui::run(config).await
    }

    /// CLI flags take priority over file and environment values
    fn apply_to(&self, config: &mut Config) {
        if let Some(theme) = &self.theme {
            config.theme = theme.clone();
        }
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate_ms = tick_rate;
        }
        if self.no_mouse {
            config.mouse_enabled = false;
        }
    }
}
