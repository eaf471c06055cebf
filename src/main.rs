use and_cli::dispatch::{Dispatcher, wants_verbose};
use and_cli::logging::init_logging;
use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    init_logging(wants_verbose(&args));

    let project_dir = std::env::current_dir().context("Failed to get current directory")?;

    let code = match Dispatcher::new(project_dir).run(args).await {
        Ok(code) => code,
        Err(err) => {
            err.report();
            err.exit_code()
        }
    };

    std::process::exit(code)
}
