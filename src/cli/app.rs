//! Main CLI application

use crate::cli::ci::report_ci_comparison;
use crate::config::{load_config, validate_config, Config};
use crate::error::OrchestratorError;
use crate::runner::{run_plan, Context, Mode, Plan, TaskRegistry, TracingReporter, Verbosity};
use crate::ui::{render_summary, RunReport};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Name of the installed binary
pub const BIN_NAME: &str = "stackwizard-check";

/// CLI application
pub struct App {
    /// Parsed arguments
    matches: ArgMatches,
}

impl App {
    /// Create an app from the process arguments
    pub fn new() -> Self {
        App {
            matches: build_command().get_matches(),
        }
    }

    /// Create an app from explicit arguments (first item is the binary name)
    pub fn from_args<I, T>(args: I) -> Result<Self, OrchestratorError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = build_command()
            .try_get_matches_from(args)
            .map_err(|e| OrchestratorError::Usage(e.to_string()))?;
        Ok(App { matches })
    }

    /// Run the application; returns the run's verdict
    pub fn run(self) -> Result<bool, OrchestratorError> {
        let matches = &self.matches;

        if let Some(shell) = matches.get_one::<Shell>("completions") {
            clap_complete::generate(*shell, &mut build_command(), BIN_NAME, &mut io::stdout());
            return Ok(true);
        }

        let verbosity = get_verbosity(matches);
        init_tracing(verbosity);

        // Mode errors are reported before any configuration or task work
        let mode: Mode = matches
            .get_one::<String>("mode")
            .map(String::as_str)
            .unwrap_or("smart")
            .parse()?;

        let dir = matches.get_one::<PathBuf>("dir");
        let (config, config_path) = load_config(
            matches.get_one::<PathBuf>("file").map(PathBuf::as_path),
            dir.map(PathBuf::as_path),
        )?;

        let mut registry = TaskRegistry::builtin()?;
        validate_config(&config, &registry)?;
        registry.apply_overrides(&config.tasks)?;

        let ctx = build_context(
            &config,
            config_path.as_deref(),
            dir,
            verbosity,
        );
        tracing::debug!(
            "Running {} mode in {} (config: {})",
            mode,
            ctx.working_dir.display(),
            config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string())
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let plan = Plan::for_mode(mode);
        let outcome = runtime.block_on(run_plan(&plan, &registry, &ctx, &TracingReporter))?;
        let report = RunReport::new(mode, outcome);

        if matches.get_flag("json") {
            println!("{}", report.to_json()?);
        } else if verbosity > Verbosity::Silent {
            print!("{}", render_summary(&report));
        }

        if let Some(path) = matches.get_one::<PathBuf>("report") {
            fs::write(path, report.to_json()?)?;
            tracing::info!("Report written to {}", path.display());
        }

        if matches.get_flag("compare-ci") {
            let ci = config.ci.clone().unwrap_or_default();
            runtime.block_on(report_ci_comparison(&ci.command, &ctx, report.summary.ready));
        }

        Ok(report.summary.ready)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new(BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run StackWizard checks in quick, smart or full mode")
        .arg(
            Arg::new("mode")
                .value_name("MODE")
                .help("Execution mode: quick, smart or full")
                .default_value("smart"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to orchestrator.yml config file"),
        )
        .arg(
            Arg::new("dir")
                .short('C')
                .long("dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Directory to run tasks in"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print errors and the summary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output, including command output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the run report as JSON instead of the summary")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Also write the run report as JSON to FILE"),
        )
        .arg(
            Arg::new("compare-ci")
                .long("compare-ci")
                .help("Compare the result with the latest CI run (best effort)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(value_parser!(Shell))
                .help("Print shell completions and exit"),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Set up console logging on stderr; RUST_LOG overrides the verbosity flags
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .with_filter(filter),
        )
        .try_init();
}

/// Resolve the run context from config and flags
///
/// Tasks run in `--dir` if given, else next to the config file, else in the
/// current directory.
fn build_context(
    config: &Config,
    config_path: Option<&Path>,
    dir: Option<&PathBuf>,
    verbosity: Verbosity,
) -> Context {
    let mut ctx = Context::new().with_verbosity(verbosity);

    if let Some(dir) = dir {
        ctx = ctx.with_working_dir(dir.clone());
    } else if let Some(parent) = config_path.and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            ctx = ctx.with_working_dir(parent.to_path_buf());
        }
    }

    if let Some(interpreter) = &config.interpreter {
        ctx = ctx.with_interpreter(interpreter.clone());
    }
    if let Some(diff_base) = &config.diff_base {
        ctx = ctx.with_diff_base(diff_base.clone());
    }

    ctx
}

/// Run the CLI application with process arguments
pub fn run() -> Result<bool, OrchestratorError> {
    App::new().run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_get_verbosity_normal() {
        let matches = build_command().get_matches_from(vec![BIN_NAME]);
        assert_eq!(get_verbosity(&matches), Verbosity::Normal);
    }

    #[test]
    fn test_get_verbosity_flags() {
        let matches = build_command().get_matches_from(vec![BIN_NAME, "quick", "-v"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Verbose);

        let matches = build_command().get_matches_from(vec![BIN_NAME, "-q", "-v"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Quiet);

        let matches = build_command().get_matches_from(vec![BIN_NAME, "-s", "-q"]);
        assert_eq!(get_verbosity(&matches), Verbosity::Silent);
    }

    #[test]
    fn test_mode_defaults_to_smart() {
        let matches = build_command().get_matches_from(vec![BIN_NAME]);
        assert_eq!(
            matches.get_one::<String>("mode").map(String::as_str),
            Some("smart")
        );
    }

    #[test]
    fn test_invalid_mode_is_error() {
        let app = App::from_args(vec![BIN_NAME, "fast"]).unwrap();
        let result = app.run();
        assert!(matches!(result, Err(OrchestratorError::InvalidMode(m)) if m == "fast"));
    }

    #[test]
    fn test_build_context_prefers_dir_flag() {
        let config = Config {
            interpreter: Some(vec!["bash".to_string(), "-c".to_string()]),
            diff_base: Some("origin/main".to_string()),
            ci: None,
            tasks: HashMap::new(),
        };
        let dir = PathBuf::from("/srv/stackwizard");
        let ctx = build_context(
            &config,
            Some(Path::new("/repo/orchestrator.yml")),
            Some(&dir),
            Verbosity::Normal,
        );

        assert_eq!(ctx.working_dir, dir);
        assert_eq!(ctx.interpreter, vec!["bash", "-c"]);
        assert_eq!(ctx.diff_base, "origin/main");
    }

    #[test]
    fn test_build_context_uses_config_dir() {
        let ctx = build_context(
            &Config::default(),
            Some(Path::new("/repo/orchestrator.yml")),
            None,
            Verbosity::Quiet,
        );
        assert_eq!(ctx.working_dir, PathBuf::from("/repo"));
        assert_eq!(ctx.verbosity, Verbosity::Quiet);
    }
}
