use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use reconf_cli::config::{
	Recipe, discover_configs, generate_init_template, load_config_file, load_merged_config,
};
use reconf_cli::recipes::compile_recipes;
use reconf_cli::workspace::{RunOptions, run};

#[derive(Parser)]
#[command(name = "reconf")]
#[command(
	author,
	version,
	about = "CLI tool for conditionally rewriting YAML and HCL configuration"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Create a template .reconf.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .reconf.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Log every decision made while running recipes
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Run every configured recipe over a directory tree
	Run {
		/// Workspace root (defaults to the current directory)
		#[arg(long, value_name = "DIR")]
		root: Option<PathBuf>,

		/// Use this config file instead of discovering .reconf.toml files
		#[arg(long, value_name = "FILE")]
		config: Option<PathBuf>,

		/// Report what would change without writing anything
		#[arg(long)]
		dry_run: bool,
	},
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display discovered config files and their recipes
	Show,
	/// Check all config files for errors without running anything
	Validate,
}

fn main() -> ExitCode {
	match run_cli() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run_cli() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	let Some(command) = cli.command else {
		return Ok(ExitCode::SUCCESS);
	};

	match command {
		Commands::Run {
			root,
			config,
			dry_run,
		} => handle_run(root, config.as_deref(), dry_run),
		Commands::Config { action } => match action {
			ConfigAction::Show => handle_config_show(),
			ConfigAction::Validate => handle_config_validate(),
		},
	}
}

fn init_tracing(verbose: bool) {
	let default_level = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("reconf_cli={default_level}")));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(".reconf.toml");

	if config_path.exists() && !force {
		anyhow::bail!(".reconf.toml already exists. Use --force to overwrite.");
	}

	let template = generate_init_template();
	std::fs::write(&config_path, template)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created .reconf.toml");
	Ok(ExitCode::SUCCESS)
}

fn handle_run(root: Option<PathBuf>, config: Option<&Path>, dry_run: bool) -> Result<ExitCode> {
	let root = match root {
		Some(root) => root,
		None => std::env::current_dir().context("Failed to get current directory")?,
	};

	let merged = match config {
		Some(path) => load_config_file(path)
			.with_context(|| format!("Failed to load {}", path.display()))?,
		None => load_merged_config(&root).context("Failed to load configuration")?,
	};
	let recipes = compile_recipes(&merged).context("Failed to compile recipes")?;

	if recipes.is_empty() {
		println!("No recipes configured.");
		return Ok(ExitCode::SUCCESS);
	}

	let report = run(&root, &recipes, RunOptions { dry_run })
		.with_context(|| format!("Failed to run recipes in {}", root.display()))?;

	if report.is_empty() {
		println!("No changes.");
	}
	for change in &report.changes {
		println!("{} {}", change.kind, change.path.display());
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		println!("# recipes: {}", loaded.config.recipes.len());
		println!();

		for (i, recipe) in loaded.config.recipes.iter().enumerate() {
			println!("  Recipe {}: {}", i + 1, recipe.label());
			print_recipe(recipe);
			println!();
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn print_recipe(recipe: &Recipe) {
	println!("    type: {}", recipe.kind());
	match recipe {
		Recipe::CreateFiles(r) => {
			println!("    file_pattern: {}", r.file_pattern);
		}
		Recipe::ChangeYaml(r) => {
			println!("    target: {}", r.target);
			print_value_change(r.old_value.as_deref(), &r.new_value, r.regex);
			for condition in &r.conditions {
				println!("    condition: {} == {}", condition.path, condition.value);
			}
			if let Some(ref pattern) = r.file_pattern {
				println!("    file_pattern: {}", pattern);
			}
		}
		Recipe::ChangeHcl(r) => {
			println!("    attribute: {}", r.attribute);
			print_value_change(r.old_value.as_deref(), &r.new_value, r.regex);
			for condition in &r.comment_conditions {
				println!(
					"    comment_condition: {} {}",
					condition.pattern, condition.value
				);
			}
			if let Some(ref pattern) = r.file_pattern {
				println!("    file_pattern: {}", pattern);
			}
		}
	}
}

fn print_value_change(old_value: Option<&str>, new_value: &str, regex: bool) {
	if let Some(old_value) = old_value {
		let label = if regex { "old_value (regex)" } else { "old_value" };
		println!("    {}: {}", label, old_value);
	}
	println!("    new_value: {}", new_value);
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	match discover_configs(&cwd) {
		Ok(configs) => {
			if configs.is_empty() {
				println!("No configuration files found.");
			} else {
				println!("All configuration files are valid:");
				for loaded in &configs {
					println!(
						"  {} ({} recipes)",
						loaded.path.display(),
						loaded.config.recipes.len()
					);
				}
			}
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
