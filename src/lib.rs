pub mod ai;
pub mod apply;
pub mod classify;
pub mod compiler;
pub mod config;
pub mod converter;
pub mod css;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod markup;
pub mod modern;
pub mod namer;
pub mod scanner;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::ai::AiClient;
use crate::compiler::{CssCompiler, TailwindCli, compile_rules};
use crate::config::Config;
use crate::converter::{Converter, SemanticRule, artifact_stem};
use crate::css::CssOptions;
use crate::error::Error as ConvertError;
use crate::mapping::MappingEngine;
use crate::markup::ClassStyle;
use crate::namer::extract_component_from_filename;
use crate::scanner::{Document, Flavor, ScanOptions};

/// Environment variable holding a `tracing` filter that overrides `--verbose`.
pub const LOG_ENV: &str = "SEMCSS_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "semcss",
    about = "Convert utility-class markup into semantically named CSS rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Subcommands>,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Convert a file or directory, writing stylesheets and rewritten markup.
    Convert(ConvertArgs),
    /// List each file's element groups and token categories.
    Scan(ScanArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ConvertArgs {
    /// Source file or directory.
    #[arg(short, long)]
    pub input: PathBuf,
    /// Directory receiving the generated files.
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(short, long)]
    pub verbose: bool,
    /// Config file; defaults to semcss.toml in the working directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Also emit @apply, theme and compiled stylesheets.
    #[arg(long)]
    pub compile: bool,
    /// Ask the configured model about unknown classes.
    #[arg(long)]
    pub ai: bool,
    #[arg(long)]
    pub minify: bool,
    /// Glob of paths to skip; may be repeated.
    #[arg(short = 'I', long = "ignore")]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ScanArgs {
    pub input: PathBuf,
    #[arg(short, long)]
    pub verbose: bool,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(short = 'I', long = "ignore")]
    pub ignore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Convert(ConvertArgs),
    Scan(ScanArgs),
    /// Rendered usage text.
    Help(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Totals reported at the end of a `convert` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub files: usize,
    pub rules: usize,
}

pub fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Convert(args) => {
            init_tracing(args.verbose);
            let summary = run_convert(&args)?;
            eprintln!(
                "converted {} files, generated {} rules",
                summary.files, summary.rules
            );
            Ok(())
        }
        Command::Scan(args) => {
            init_tracing(args.verbose);
            run_scan(&args).map_err(CliError::from)
        }
        Command::Help(text) => {
            print!("{}", text);
            Ok(())
        }
    }
}

pub fn run_from_env() -> Result<(), CliError> {
    let command = parse_args(env::args().skip(1))?;
    run(command)
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let argv = std::iter::once("semcss".to_string()).chain(args);
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(match cli.command {
            Some(Subcommands::Convert(args)) => Command::Convert(args),
            Some(Subcommands::Scan(args)) => Command::Scan(args),
            None => Command::Help(Cli::command().render_long_help().to_string()),
        }),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Command::Help(err.to_string()))
        }
        Err(err) => {
            let rendered = err.to_string();
            Err(CliError {
                message: rendered.trim_start_matches("error: ").trim_end().to_string(),
            })
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("semcss={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config, ConvertError> {
    let base_dir = env::current_dir().map_err(|err| ConvertError::read(".", err))?;
    Ok(config::load_or_default(path, &base_dir)?)
}

fn run_convert(args: &ConvertArgs) -> Result<ConvertSummary, ConvertError> {
    let config = load_config(args.config.as_deref())?;
    let engine = MappingEngine::with_colors(config.theme.colors.clone());
    let options = ScanOptions {
        ignore_patterns: args.ignore.clone(),
        ..ScanOptions::default()
    };
    let sources: Vec<PathBuf> = scanner::collect_sources(&args.input, &options)?
        .into_iter()
        .filter(|source| !source.starts_with(&args.output))
        .collect();
    let root = source_root(&args.input);

    let mut converter = Converter::new(engine.clone());
    if args.ai || config.ai.enabled {
        match AiClient::from_env(&config.ai) {
            Ok(client) => converter = converter.with_resolver(Box::new(client)),
            Err(err) => tracing::warn!("AI resolver unavailable: {}", err),
        }
    }
    let compiler = (args.compile || config.compiler.enabled)
        .then(|| TailwindCli::new(&config.compiler));
    let css_options = CssOptions {
        minify: args.minify,
        header: config.output.header,
    };

    tracing::debug!("using theme {}", config.theme.name);
    tracing::info!("converting {} files from {}", sources.len(), args.input.display());
    let mut summary = ConvertSummary::default();
    for source in &sources {
        let document = scanner::parse_document(source, &engine)?;
        let target_dir = output_dir(&root, source, &args.output);
        fs::create_dir_all(&target_dir).map_err(|err| ConvertError::write(&target_dir, err))?;
        let file_name = source
            .file_name()
            .ok_or_else(|| ConvertError::InvalidFileName(source.clone()))?;
        let markup_path = target_dir.join(file_name);

        if document.usages.is_empty() {
            tracing::debug!("{}: no class attributes", source.display());
            write_file(&markup_path, &document.text)?;
            summary.files += 1;
            continue;
        }

        let rules = converter.convert_document(&document);
        if rules.is_empty() {
            tracing::debug!("{}: no utility classes", source.display());
            write_file(&markup_path, &document.text)?;
            summary.files += 1;
            continue;
        }

        let stem = artifact_stem(source)
            .ok_or_else(|| ConvertError::InvalidFileName(source.clone()))?;
        let module = config.output.css_module || document.flavor == Flavor::Script;
        let (style, stylesheet) = if module {
            (ClassStyle::Module, format!("{}.module.css", stem))
        } else {
            (ClassStyle::Plain, format!("{}.css", stem))
        };

        let css = css::generate(&rules, css_options);
        write_file(&target_dir.join(&stylesheet), css.as_str())?;
        write_file(
            &markup_path,
            &markup::rewrite(&document, &rules, style, &stylesheet),
        )?;

        if let Some(compiler) = compiler.as_ref() {
            write_compiled_artifacts(
                &document,
                &rules,
                converter.engine(),
                compiler,
                &target_dir,
                stem,
            )?;
        }

        tracing::debug!("{}: {} rules", source.display(), rules.len());
        summary.files += 1;
        summary.rules += rules.len();
    }
    tracing::info!("wrote output to {}", args.output.display());
    Ok(summary)
}

/// Writes `<stem>.apply.css`, `<stem>.theme.css` and, when the compiler
/// succeeds, `<stem>.compiled.css`.
fn write_compiled_artifacts(
    document: &Document,
    rules: &[SemanticRule],
    engine: &MappingEngine,
    compiler: &dyn CssCompiler,
    target_dir: &Path,
    stem: &str,
) -> Result<(), ConvertError> {
    let apply_css = apply::generate_apply_css(rules, engine);
    write_file(&target_dir.join(format!("{}.apply.css", stem)), &apply_css)?;

    let file_name = document
        .path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(stem);
    let mut component = extract_component_from_filename(file_name);
    if component.is_empty() {
        component = stem.to_string();
    }
    let theme_css = apply::generate_theme_css(rules, engine, &component);
    write_file(&target_dir.join(format!("{}.theme.css", stem)), &theme_css)?;

    match compile_rules(compiler, &apply_css, rules) {
        Ok(compiled) if !compiled.is_empty() => {
            write_file(&target_dir.join(format!("{}.compiled.css", stem)), &compiled)?;
        }
        Ok(_) => tracing::debug!(
            "{}: compiler produced no component rules",
            document.path.display()
        ),
        Err(err) => tracing::warn!(
            "skipping compiled CSS for {}: {}",
            document.path.display(),
            err
        ),
    }
    Ok(())
}

fn run_scan(args: &ScanArgs) -> Result<(), ConvertError> {
    let config = load_config(args.config.as_deref())?;
    let engine = MappingEngine::with_colors(config.theme.colors);
    let options = ScanOptions {
        ignore_patterns: args.ignore.clone(),
        ..ScanOptions::default()
    };
    let result = scanner::scan(&args.input, &options, &engine)?;

    let mut classes = BTreeSet::new();
    for document in &result.documents {
        println!("{}", document.path.display());
        for group in extract::group_by_element(extract::extract(document)).values() {
            println!("  <{}>", group.element);
            for token in &group.tokens {
                println!("    {} ({})", token.text, token.category);
                classes.insert(token.text.clone());
            }
        }
    }

    eprintln!(
        "scanned {} files, found {} classes",
        result.files_scanned,
        classes.len()
    );
    Ok(())
}

/// Directory that relative output paths are computed from.
fn source_root(input: &Path) -> PathBuf {
    if input.is_file() {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        input.to_path_buf()
    }
}

/// `src/components/Card.tsx` under root `src` -> `<output>/components`.
fn output_dir(root: &Path, source: &Path, output: &Path) -> PathBuf {
    let relative = source.strip_prefix(root).unwrap_or(source);
    match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => output.join(parent),
        _ => output.to_path_buf(),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ConvertError> {
    fs::write(path, contents).map_err(|err| ConvertError::write(path, err))
}
