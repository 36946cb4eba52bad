use clap::{ArgAction, Args, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::io::{self, BufReader, BufWriter, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use glance::commands::{self, PipeOptions, ShowOptions};
use glance::select::stream::DEFAULT_HEAD_TAIL;
use glance::{Around, GlanceConfig, GlanceError, LineRange};

const AFTER_HELP: &str = "\
Examples:
  make 2>&1 | glance                       Head 10 + tail 10
  kubectl logs pod/api | glance -p errors  Plus lines matching a preset
  docker compose up 2>&1 | glance -p errors -f 'db:5432'
  glance show 20260219-143022-a3f8b1c0 -a 247:5

Environment:
  XDG_CACHE_HOME   captures live in $XDG_CACHE_HOME/glance/captures
  XDG_CONFIG_HOME  user presets live in $XDG_CONFIG_HOME/glance/presets.conf
  GLANCE_LOG       tracing filter for diagnostics on stderr";

#[derive(Parser)]
#[command(name = "glance")]
#[command(about = "Summarize command output: head/tail lines plus regex matches, with an ID to drill into the full output")]
#[command(version)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    pipe: PipeArgs,

    /// Debug mode - log processing details to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args)]
struct FilterArgs {
    /// Regex filter, case-insensitive (repeatable, OR)
    #[arg(short = 'f', long = "filter", value_name = "REGEX", action = ArgAction::Append, allow_hyphen_values = true)]
    filters: Vec<String>,

    /// Named preset filter (repeatable, OR)
    #[arg(short = 'p', long = "preset", value_name = "NAME", action = ArgAction::Append)]
    presets: Vec<String>,
}

#[derive(Args)]
struct PipeArgs {
    /// Head/tail line count
    #[arg(
        short = 'n',
        long = "head",
        visible_alias = "lines",
        value_name = "N",
        default_value_t = DEFAULT_HEAD_TAIL,
        value_parser = parse_head_tail
    )]
    head_tail: usize,

    #[command(flatten)]
    filter: FilterArgs,

    /// Don't store the capture (no ID is issued)
    #[arg(long)]
    no_store: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve a stored capture, whole or in part
    Show {
        /// Capture ID, as printed in the footer
        id: String,

        /// Line range (repeatable)
        #[arg(short = 'l', long = "lines", value_name = "N-M", value_parser = parse_line_range)]
        ranges: Vec<LineRange>,

        /// Context around a line, default context 5 (repeatable)
        #[arg(short = 'a', long = "around", value_name = "LINE[:CONTEXT]", value_parser = parse_around)]
        around: Vec<Around>,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List stored captures
    List,
    /// Remove stored captures
    Clean {
        /// Also remove user presets
        #[arg(long)]
        all: bool,
    },
    /// Manage filter presets
    Presets {
        #[command(subcommand)]
        action: PresetsCommand,
    },
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// Show built-in and user presets
    List,
    /// Add or replace a user preset
    Add {
        /// Delimiter for the presets file entry
        #[arg(short = 'd', long = "delimiter", value_name = "CHAR")]
        delimiter: Option<String>,
        name: String,
        #[arg(allow_hyphen_values = true)]
        regex: String,
        description: Option<String>,
    },
    /// Remove a user preset
    Remove { name: String },
}

fn parse_head_tail(s: &str) -> Result<usize, String> {
    s.parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| "-n must be a positive integer".to_string())
}

fn parse_line_range(s: &str) -> Result<LineRange, String> {
    s.parse().map_err(|e: glance::ConfigError| e.to_string())
}

fn parse_around(s: &str) -> Result<Around, String> {
    s.parse().map_err(|e: glance::ConfigError| e.to_string())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "glance=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GLANCE_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(debug)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        if is_broken_pipe(&e) {
            return;
        }
        eprintln!("glance: {}", e);
        if let Some(err) = e.downcast_ref::<GlanceError>() {
            debug!(kind = ?err.kind(), "command failed");
            if let Some(hint) = err.hint() {
                eprintln!("{}", hint);
            }
        }
        std::process::exit(1);
    }
}

fn is_broken_pipe(e: &anyhow::Error) -> bool {
    if let Some(err) = e.downcast_ref::<GlanceError>() {
        return err.is_broken_pipe();
    }
    e.downcast_ref::<io::Error>()
        .is_some_and(|err| err.kind() == io::ErrorKind::BrokenPipe)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = GlanceConfig::from_env()?;
    debug!(cache = %config.cache_dir.display(), config = %config.config_dir.display(), "resolved directories");

    let mut output = BufWriter::with_capacity(config.buffer_size, io::stdout());

    match cli.command {
        None => {
            if io::stdin().is_terminal() {
                anyhow::bail!("no input. Pipe command output to glance or use a subcommand.\nTry: glance --help");
            }
            let opts = PipeOptions {
                head_tail: cli.pipe.head_tail,
                filters: cli.pipe.filter.filters,
                presets: cli.pipe.filter.presets,
                no_store: cli.pipe.no_store,
            };
            let input = BufReader::with_capacity(config.buffer_size, io::stdin());
            commands::run_pipe(&config, &opts, input, &mut output)?;
        }
        Some(Command::Show {
            id,
            ranges,
            around,
            filter,
        }) => {
            let opts = ShowOptions {
                id,
                ranges,
                around,
                filters: filter.filters,
                presets: filter.presets,
            };
            commands::run_show(&config, &opts, &mut output)?;
        }
        Some(Command::List) => commands::run_list(&config, &mut output)?,
        Some(Command::Clean { all }) => commands::run_clean(&config, all, &mut output)?,
        Some(Command::Presets { action }) => match action {
            PresetsCommand::List => commands::run_presets_list(&config, &mut output)?,
            PresetsCommand::Add {
                delimiter,
                name,
                regex,
                description,
            } => commands::run_presets_add(
                &config,
                &name,
                &regex,
                description.as_deref().unwrap_or(""),
                delimiter.as_deref(),
                &mut output,
            )?,
            PresetsCommand::Remove { name } => {
                commands::run_presets_remove(&config, &name, &mut output)?
            }
        },
    }

    output.flush()?;
    Ok(())
}
