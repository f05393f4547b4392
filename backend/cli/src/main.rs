mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use mdforge_markdown::{MarkdownEngine, MokaRenderCache};

use config::{Config, DEFAULT_LOG_LEVEL};

#[derive(Parser, Debug)]
#[command(name = "mdforge")]
#[command(about = "Render Markdown to HTML and lint Markdown documents")]
#[command(version)]
struct Cli {
    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Disable the in-process render cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a Markdown file (or `-` for stdin) to HTML
    Render {
        input: PathBuf,
        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print lint warnings; exits with status 1 when there are any
    Validate { input: PathBuf },
    /// Dump the parsed block structure as JSON
    Blocks { input: PathBuf },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(&config);

    let mut engine = MarkdownEngine::with_config(config.engine.clone());
    if config.cache_enabled {
        engine = engine.with_cache(Arc::new(MokaRenderCache::new()));
    }
    debug!(?config, "Starting mdforge");

    let clean = run(&cli.command, &engine)?;
    Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if cli.json_logs {
        config.json_logs = true;
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }
    Ok(config)
}

/// Logs go to stderr so rendered HTML on stdout stays clean.
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_LEVEL));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

/// Execute one subcommand. `Ok(false)` means the lint found problems.
fn run(command: &Commands, engine: &MarkdownEngine) -> Result<bool> {
    match command {
        Commands::Render { input, output } => {
            let html = if is_stdin(input) {
                engine.render(&read_stdin()?)
            } else {
                engine
                    .render_file(input)
                    .with_context(|| format!("Failed to render {}", input.display()))?
            };
            match output {
                Some(path) => write_output(path, &html)?,
                None => print!("{html}"),
            }
        }
        Commands::Validate { input } => {
            let warnings = engine.validate(&read_input(input)?);
            for warning in &warnings {
                println!("{warning}");
            }
            return Ok(warnings.is_empty());
        }
        Commands::Blocks { input } => {
            let blocks = engine.parse_blocks(&read_input(input)?);
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
    }
    Ok(true)
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read Markdown from stdin")?;
    Ok(buf)
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        return read_stdin();
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: &Path, html: &str) -> Result<()> {
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_with_output() {
        let cli = Cli::try_parse_from(["mdforge", "render", "doc.md", "-o", "doc.html", "--no-cache"]).unwrap();
        assert!(cli.no_cache);
        match cli.command {
            Commands::Render { input, output } => {
                assert_eq!(input, PathBuf::from("doc.md"));
                assert_eq!(output, Some(PathBuf::from("doc.html")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["mdforge"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from(["mdforge", "--log-level", "trace", "--json-logs", "--no-cache", "validate", "-"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.log_level, "trace");
        assert!(config.json_logs);
        assert!(!config.cache_enabled);
    }

    #[test]
    fn test_render_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.md");
        let output = dir.path().join("out.html");
        std::fs::write(&input, "# Title").unwrap();

        let command = Commands::Render {
            input,
            output: Some(output.clone()),
        };
        assert!(run(&command, &MarkdownEngine::new()).unwrap());
        assert_eq!(std::fs::read_to_string(output).unwrap(), "<h1 id=\"title\">Title</h1>\n");
    }

    #[test]
    fn test_render_missing_file_errors() {
        let command = Commands::Render {
            input: PathBuf::from("/definitely/missing.md"),
            output: None,
        };
        let err = run(&command, &MarkdownEngine::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to render"));
    }

    #[test]
    fn test_write_output_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.html");

        let err = write_output(&path, "<p>x</p>\n").unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
        assert!(err.to_string().contains("out.html"));
        assert!(err.chain().count() >= 2);
    }

    #[test]
    fn test_validate_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.md");
        let noisy = dir.path().join("noisy.md");
        std::fs::write(&clean, "# ok").unwrap();
        std::fs::write(&noisy, "[x]()").unwrap();

        let engine = MarkdownEngine::new();
        assert!(run(&Commands::Validate { input: clean }, &engine).unwrap());
        assert!(!run(&Commands::Validate { input: noisy }, &engine).unwrap());
    }
}
