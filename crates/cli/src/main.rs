mod backend;
mod config;
mod env;
mod error;

use std::process::Command;

use clap::{CommandFactory, Parser, ValueEnum};
use directive::{Compiler, Executable, HostFs};
use policy::PolicyContext;
use tracing_subscriber::EnvFilter;

use backend::{Backend, Bwrap};
use config::Config;
use env::Environment;
use error::{Error, Result};

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser, Debug)]
#[command(name = "confine")]
#[command(about = "Run a program inside a capability-driven bubblewrap sandbox", long_about = None)]
#[command(version)]
struct Cli {
    /// Print the backend command line instead of executing it
    #[arg(long)]
    print: bool,

    /// How TARGET is interpreted
    #[arg(value_enum)]
    kind: ExecKind,

    /// TARGET (executable name or path) followed by arguments forwarded
    /// verbatim to the confined program
    #[arg(
        value_name = "TARGET",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

impl Cli {
    fn target(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Everything after TARGET, untouched by option parsing.
    fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExecKind {
    /// TARGET is a bare executable name
    Name,
    /// TARGET is a path used verbatim
    Path,
    /// Show this help
    Help,
}

fn main() {
    let env = Environment::capture();
    init_logging(env.log_filter().as_deref());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli, &env) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = filter
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, env: &Environment) -> Result<()> {
    let Some(target) = requested_target(&cli)? else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = Config::discover(env.config_path().as_deref())?;
    let executable = resolve_executable(cli.kind, target, &config)?;

    let policy = env.policy();
    let ctx = PolicyContext::resolve(&policy, env.window_system());
    let session = env.session();
    let plan = Compiler::new(&policy, &ctx, &session, &HostFs)
        .with_custom(env.custom_grants())
        .with_hostname(config.exec.hostname.clone())
        .compile(executable);

    let backend = Bwrap::new(config.backend.command);
    if cli.print {
        println!("{}", command_line(&backend.command(&plan, cli.args())));
        return Ok(());
    }

    Err(backend.exec(&plan, cli.args()))
}

/// Shell-quoted rendering of a command, one word per argument.
fn command_line(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| shell_escape::escape(a.to_string_lossy()).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The target to run, or `None` when only help was asked for.
fn requested_target(cli: &Cli) -> Result<Option<&str>> {
    match (cli.kind, cli.target()) {
        (ExecKind::Help, _) => Ok(None),
        (_, None) => Err(Error::Usage("missing TARGET".into())),
        (_, Some("")) => Err(Error::Usage("TARGET must not be empty".into())),
        (_, Some(target)) => Ok(Some(target)),
    }
}

fn resolve_executable(kind: ExecKind, target: &str, config: &Config) -> Result<Executable> {
    match kind {
        ExecKind::Name if target.contains('/') => Err(Error::Usage(format!(
            "'{target}' is a path; use the 'path' selector"
        ))),
        ExecKind::Name => Ok(Executable::by_name(&config.exec.bin_dir, target)),
        ExecKind::Path => Ok(Executable::by_path(target)),
        ExecKind::Help => Err(Error::Usage("help does not take a target".into())),
    }
}
