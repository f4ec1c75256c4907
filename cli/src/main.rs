mod analytics;
mod engine;
mod help;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use schematic_catalog::{CollectionRegistry, WorkspaceConfig};
use schematic_core::{GenerateCommand, GenerateOptions, RunOutcome, SubcommandDescription};
use serde::Serialize;
use tracing::debug;

/// Output format for `list`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "schematic")]
#[command(about = "Resolve, describe and run schematic generators")]
struct Cli {
    /// Workspace configuration file (default: nearest .schematic.yml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Extra directory to search for collections; may be repeated.
    #[arg(long = "collections", value_name = "DIR", global = true)]
    collections: Vec<PathBuf>,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates and/or modifies files based on a schematic.
    #[command(visible_alias = "g", disable_help_flag = true)]
    Generate(GenerateArgs),
    /// List the schematics of a collection.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// The schematic or collection:schematic to generate.
    schematic: Option<String>,
    /// Enables debug mode.
    #[arg(long)]
    debug: bool,
    /// Run through without making any changes.
    #[arg(long)]
    dry_run: bool,
    /// Forces overwriting of files.
    #[arg(long)]
    force: bool,
    /// Shows help for the command or for the given schematic.
    #[arg(short, long)]
    help: bool,
    /// Arguments passed through to the schematic.
    #[arg(last = true, value_name = "ARGS")]
    schematic_options: Vec<String>,
}

impl GenerateArgs {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            schematic: self.schematic.clone(),
            schematic_options: self.schematic_options.clone(),
            debug: self.debug,
            dry_run: self.dry_run,
            force: self.force,
        }
    }
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Collection to list (default: the workspace default collection).
    collection: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: ListFormat,
}

/// One row of `list` output.
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    aliases: &'a [String],
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };
    std::process::exit(code);
}

fn configure_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32, String> {
    let config = load_config(cli.config.as_ref())?;
    let registry = build_registry(&config, &cli.collections)?;

    match cli.command {
        Command::Generate(args) => run_generate(&config, &registry, args),
        Command::List(args) => run_list(&config, &registry, args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<WorkspaceConfig, String> {
    if let Some(path) = path {
        return WorkspaceConfig::load(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()));
    }

    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to read current directory: {err}"))?;
    let config = WorkspaceConfig::discover(&cwd).map_err(|err| err.to_string())?;
    if config.is_none() {
        debug!("no workspace config found, using defaults");
    }
    Ok(config.unwrap_or_default())
}

fn build_registry(
    config: &WorkspaceConfig,
    extra_roots: &[PathBuf],
) -> Result<CollectionRegistry, String> {
    config
        .registry_builder(extra_roots)
        .build()
        .map_err(|err| err.to_string())
}

fn generate_command<'a>(
    config: &WorkspaceConfig,
    registry: &'a CollectionRegistry,
) -> Result<GenerateCommand<'a>, String> {
    let schemas = config.schema_registry().map_err(|err| err.to_string())?;
    Ok(GenerateCommand::new(config.dispatch_config(), registry).with_schema_registry(schemas))
}

fn run_generate(
    config: &WorkspaceConfig,
    registry: &CollectionRegistry,
    args: GenerateArgs,
) -> Result<i32, String> {
    let options = args.options();
    let mut command = generate_command(config, registry)?;
    let spec = command.initialize(&options).map_err(|err| err.to_string())?;
    let hint = spec.subcommand_count() == 1;

    if args.help {
        match (command.selected_subcommand(), options.schematic.as_deref()) {
            (Some(sub), Some(key)) => print!("{}", help::render_subcommand_help(key, sub)),
            _ => print_generate_help(&command, hint),
        }
        return Ok(0);
    }

    let sink = analytics::from_config(config);
    command.report_analytics(&options, sink.as_ref());

    let mut engine = engine::from_config(config.engine.as_ref());
    let outcome = command
        .run(&options, engine.as_mut())
        .map_err(|err| err.to_string())?;

    if let RunOutcome::Help { schematic_hint } = outcome {
        print_generate_help(&command, schematic_hint);
    }
    Ok(outcome.exit_code())
}

fn print_generate_help(command: &GenerateCommand<'_>, schematic_hint: bool) {
    if let Some(spec) = command.command_spec() {
        print!("{}", help::render_generate_help(spec));
    }
    if schematic_hint {
        println!();
        println!("{}", help::schematic_hint());
    }
}

fn run_list(
    config: &WorkspaceConfig,
    registry: &CollectionRegistry,
    args: ListArgs,
) -> Result<i32, String> {
    // `collection:` selects every schematic of that collection
    let options = GenerateOptions {
        schematic: args.collection.map(|name| format!("{name}:")),
        ..Default::default()
    };
    let mut command = generate_command(config, registry)?;
    let spec = command.initialize(&options).map_err(|err| err.to_string())?;

    let entries: Vec<ListEntry<'_>> = spec
        .subcommands()
        .into_iter()
        .flatten()
        .map(|(key, sub)| list_entry(key, sub))
        .collect();

    let output = match args.format {
        ListFormat::Table => format_table(&entries),
        ListFormat::Json => serde_json::to_string_pretty(&entries)
            .map(|raw| format!("{raw}\n"))
            .map_err(|err| format!("Failed to serialize list: {err}"))?,
        ListFormat::Yaml => serde_yaml::to_string(&entries)
            .map_err(|err| format!("Failed to serialize list: {err}"))?,
    };
    print!("{output}");
    Ok(0)
}

fn list_entry<'a>(key: &'a str, sub: &'a SubcommandDescription) -> ListEntry<'a> {
    ListEntry {
        key,
        description: sub.description.as_deref(),
        aliases: &sub.aliases,
    }
}

fn format_table(entries: &[ListEntry<'_>]) -> String {
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let description = entry.description.unwrap_or_default();
        let line = format!("{:<width$}  {description}", entry.key);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
