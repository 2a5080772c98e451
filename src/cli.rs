//! Command-line interface for wsl2-transport.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// What the binary should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a command on the target.
    Exec { command: String },
    /// Copy a controller file to the target.
    Put {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Copy a target file to the controller.
    Fetch {
        source: PathBuf,
        destination: PathBuf,
    },
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Host name or address of the managed node.
    pub host: Option<String>,
    /// Hyper-V guest name.
    pub vm_name: Option<String>,
    /// User to log in as.
    pub user: Option<String>,
    /// Password for the user.
    pub password: Option<String>,
    /// Shell executable.
    pub shell: Option<String>,
    /// Working directory for spawned children.
    pub cwd: Option<PathBuf>,
    /// Enable pipelining.
    pub pipelining: bool,
    /// Skip `wslpath` translation of transfer sources.
    pub no_path_translation: bool,
    /// Escalation method name.
    pub become_method: Option<String>,
    /// Escalation prompt.
    pub become_prompt: Option<String>,
    /// File whose bytes are fed to the command; `-` reads stdin.
    pub input: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
    /// Requested action.
    pub action: Option<Action>,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positional: Vec<String> = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('H') | Long("host") => {
                result.host = Some(parser.value()?.parse()?);
            }
            Short('m') | Long("vm-name") => {
                result.vm_name = Some(parser.value()?.parse()?);
            }
            Short('u') | Long("user") => {
                result.user = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("password") => {
                result.password = Some(parser.value()?.parse()?);
            }
            Short('s') | Long("shell") => {
                result.shell = Some(parser.value()?.parse()?);
            }
            Short('C') | Long("cwd") => {
                result.cwd = Some(parser.value()?.parse()?);
            }
            Long("pipelining") => {
                result.pipelining = true;
            }
            Long("no-path-translation") => {
                result.no_path_translation = true;
            }
            Long("become") => {
                result.become_method = Some(parser.value()?.parse()?);
            }
            Long("become-prompt") => {
                result.become_prompt = Some(parser.value()?.parse()?);
            }
            Short('i') | Long("input") => {
                result.input = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                positional.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if !positional.is_empty() {
        result.action = Some(parse_action(positional)?);
    }

    Ok(result)
}

fn parse_action(positional: Vec<String>) -> Result<Action, ArgsError> {
    let mut words = positional.into_iter();
    let name = words.next().unwrap_or_default();
    let rest: Vec<String> = words.collect();

    match name.as_str() {
        "exec" => {
            if rest.is_empty() {
                return Err(ArgsError::MissingArgument("exec", "COMMAND"));
            }
            Ok(Action::Exec {
                command: rest.join(" "),
            })
        }
        "put" | "fetch" => {
            let action = if name == "put" { "put" } else { "fetch" };
            let [source, destination]: [String; 2] = rest
                .try_into()
                .map_err(|_| ArgsError::MissingArgument(action, "SRC DST"))?;
            let (source, destination) = (PathBuf::from(source), PathBuf::from(destination));
            Ok(if name == "put" {
                Action::Put {
                    source,
                    destination,
                }
            } else {
                Action::Fetch {
                    source,
                    destination,
                }
            })
        }
        _ => Err(ArgsError::UnexpectedArgument(name)),
    }
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"wsl2-transport {version}
Run commands and copy files on a WSL host or a Hyper-V guest via PowerShell

USAGE:
    wsl2-transport [OPTIONS] exec [--] <COMMAND>...
    wsl2-transport [OPTIONS] put <SRC> <DST>
    wsl2-transport [OPTIONS] fetch <SRC> <DST>

OPTIONS:
    -c, --config <FILE>         Path to configuration file (JSON)
    -H, --host <ADDR>           Managed node address [default: localhost]
    -m, --vm-name <NAME>        Hyper-V guest to enter through a remote session
    -u, --user <USER>           User to log in as
    -p, --password <PASS>       Password for the user (sent in plain text)
    -s, --shell <EXE>           Shell executable [default: powershell.exe]
    -C, --cwd <DIR>             Working directory for the shell
    -i, --input <FILE>          Feed FILE to the command's stdin ('-' for stdin)
        --pipelining            Pipeline module input over stdin
        --no-path-translation   Do not run wslpath on transfer sources
        --become <METHOD>       Privilege escalation method
        --become-prompt <TEXT>  Prompt printed by the escalation method
    -l, --log-level <LVL>       Log level (error, warn, info, debug, trace)
    -h, --help                  Print help
    -V, --version               Print version

ENVIRONMENT VARIABLES:
    WSL2_REMOTE_ADDR, WSL2_VM_NAME, WSL2_USER, WSL2_PASSWORD, WSL2_SHELL,
    WSL2_OPERATION_TIMEOUT, WSL2_CONFIGURATION_NAME, WSL2_PIPELINING,
    WSL2_LOG_LEVEL (or RUST_LOG)

EXAMPLES:
    # Run a command in the local PowerShell
    wsl2-transport exec -- Get-ChildItem C:\

    # Run a command inside a Hyper-V guest
    wsl2-transport -m build-agent -u Administrator -p secret exec hostname

    # Copy a module into the guest
    wsl2-transport -m build-agent -u Administrator -p secret put ./module.ps1 C:\Temp\module.ps1
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("wsl2-transport {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// An action is missing its operands.
    MissingArgument(&'static str, &'static str),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingArgument(action, operands) => {
                write!(f, "'{}' requires {}", action, operands)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
