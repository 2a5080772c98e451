//! wsl2-transport binary entry point.

use std::path::Path;
use std::process::ExitCode;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{error, info};

use wsl2_transport::cli::{self, Action};
use wsl2_transport::config::Config;
use wsl2_transport::{logging, AsyncSession};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'wsl2-transport --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_level(Some(config.log_filter()));
    info!("wsl2-transport v{}", env!("CARGO_PKG_VERSION"));

    let Some(action) = args.action else {
        eprintln!("error: no action given (exec, put or fetch)");
        eprintln!("Try 'wsl2-transport --help' for more information.");
        return ExitCode::from(2);
    };

    let input = match args.input.as_deref().map(read_input) {
        Some(fut) => match fut.await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                eprintln!("error: failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    match run(&config, action, input).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "operation failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    config: &Config,
    action: Action,
    input: Option<Vec<u8>>,
) -> wsl2_transport::Result<ExitCode> {
    let session = AsyncSession::new(config.build_session());
    session.connect().await?;

    let code = match action {
        Action::Exec { command } => {
            let result = session.exec_command(command, input, true).await?;
            relay_output(&result.stdout, &result.stderr).await?;
            // Signals report negative codes; the shell convention is 128 + N.
            let code = if result.exit_code < 0 {
                128 - result.exit_code
            } else {
                result.exit_code
            };
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
        Action::Put {
            source,
            destination,
        } => {
            session.put_file(source, destination).await?;
            ExitCode::SUCCESS
        }
        Action::Fetch {
            source,
            destination,
        } => {
            session.fetch_file(source, destination).await?;
            ExitCode::SUCCESS
        }
    };

    session.close().await?;
    Ok(code)
}

async fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin().read_to_end(&mut buf).await?;
        Ok(buf)
    } else {
        tokio::fs::read(path).await
    }
}

async fn relay_output(stdout: &[u8], stderr: &[u8]) -> std::io::Result<()> {
    let mut out = tokio::io::stdout();
    out.write_all(stdout).await?;
    out.flush().await?;

    let mut err = tokio::io::stderr();
    err.write_all(stderr).await?;
    err.flush().await
}
