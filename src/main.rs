use anyhow::Context;
use assemble::DashboardSettings;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod assemble;
mod error;
mod ids;
mod layout;
mod model;
mod panel;
mod presets;
mod render;
mod rows;
mod table;
mod templating;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "dashgen")]
#[command(about = "Build Grafana dashboards from declarative metric tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,

    /// Log at debug level (otherwise RUST_LOG, default warn).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a dashboard and write its JSON.
    Generate {
        /// Built-in table to use (see `presets`).
        #[arg(long, conflicts_with = "table", required_unless_present = "table")]
        preset: Option<String>,

        /// Table file (.toml, or .json).
        #[arg(long)]
        table: Option<PathBuf>,

        #[command(flatten)]
        overrides: SettingsOverrides,

        /// How sections appear in the JSON.
        #[arg(long, value_enum, default_value_t = render::RowLayout::Flat)]
        layout: render::RowLayout,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// List the built-in tables.
    Presets,
}

/// Dashboard settings that the command line can replace.
#[derive(Args, Debug, Default)]
struct SettingsOverrides {
    /// Dashboard title.
    #[arg(short, long)]
    title: Option<String>,

    /// Start of the time range, e.g. now-5m.
    #[arg(long)]
    from: Option<String>,

    /// End of the time range.
    #[arg(long)]
    to: Option<String>,

    /// Refresh interval, e.g. 5s.
    #[arg(long)]
    refresh: Option<String>,

    /// Dashboard tag; repeat for several. Replaces the table's tags.
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl SettingsOverrides {
    fn apply(self, settings: &mut DashboardSettings) {
        if let Some(title) = self.title {
            settings.title = title;
        }
        if let Some(from) = self.from {
            settings.time.from = from;
        }
        if let Some(to) = self.to {
            settings.time.to = to;
        }
        if let Some(refresh) = self.refresh {
            settings.refresh = refresh;
        }
        if !self.tags.is_empty() {
            settings.tags = self.tags;
        }
    }
}

fn load_config(
    preset: Option<&str>,
    table_path: Option<&Path>,
) -> Result<table::DashboardConfig> {
    match (preset, table_path) {
        (_, Some(path)) => table::load_table_file(path),
        (Some(name), None) => presets::find(name)?.load(),
        (None, None) => anyhow::bail!("one of --preset or --table is required"),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout is reserved for the dashboard JSON.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Generate {
            preset,
            table: table_path,
            overrides,
            layout,
            out,
        } => {
            // 1) Load the table and its settings.
            let table::DashboardConfig {
                mut settings,
                table,
            } = load_config(preset.as_deref(), table_path.as_deref())?;

            // 2) Command-line overrides.
            overrides.apply(&mut settings);

            // 3) Assemble and render. Nothing is written unless both succeed.
            let dashboard = assemble::assemble(&settings, &table)?;
            let json = render::render_dashboard(&dashboard, layout)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("write dashboard {}", path.display()))?;
                    info!(path = %path.display(), "wrote dashboard");
                }
                None => println!("{}", json),
            }
            info!(
                title = %dashboard.title,
                rows = dashboard.rows.len(),
                panels = dashboard.panel_count(),
                "dashboard generated"
            );
        }
        Commands::Presets => {
            for preset in presets::PRESETS {
                println!("{:<20} {}", preset.name, preset.summary);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generate(args: &[&str]) -> std::result::Result<Commands, clap::Error> {
        let argv = ["dashgen", "generate"].into_iter().chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.cmd)
    }

    fn overrides_from(args: &[&str]) -> SettingsOverrides {
        match generate(args).unwrap() {
            Commands::Generate { overrides, .. } => overrides,
            Commands::Presets => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn overrides_replace_loaded_settings() {
        let mut settings = DashboardSettings {
            tags: vec!["from-file".to_string()],
            ..DashboardSettings::default()
        };
        overrides_from(&[
            "--preset", "emqx5-ee", "-t", "Ops", "--from", "now-6h", "--to", "now-1h",
            "--refresh", "1m", "--tag", "a", "--tag", "b",
        ])
        .apply(&mut settings);

        assert_eq!(settings.title, "Ops");
        assert_eq!(settings.time.from, "now-6h");
        assert_eq!(settings.time.to, "now-1h");
        assert_eq!(settings.refresh, "1m");
        assert_eq!(settings.tags, vec!["a", "b"]);
    }

    #[test]
    fn absent_overrides_keep_loaded_settings() {
        let config = load_config(Some("emqx5-ee"), None).unwrap();
        let mut settings = config.settings.clone();
        overrides_from(&["--preset", "emqx5-ee"]).apply(&mut settings);
        assert_eq!(settings, config.settings);
    }

    #[test]
    fn preset_and_table_are_exclusive_and_one_is_required() {
        assert!(generate(&["--preset", "emqx5-ee", "--table", "t.toml"]).is_err());
        assert!(generate(&[]).is_err());
        assert!(generate(&["--table", "t.toml", "--layout", "nested"]).is_ok());
    }

    #[test]
    fn unknown_preset_or_missing_file_fails() {
        assert!(load_config(Some("nope"), None).is_err());
        assert!(load_config(None, Some(Path::new("/nonexistent/table.toml"))).is_err());
        assert!(load_config(None, None).is_err());
    }
}
