use std::env;
use std::io;
use std::process::ExitCode;

use tracing::{error, info};

mod app;

use app::Invocation;

fn main() -> ExitCode {
    app::init_tracing();
    let args = env::args().skip(1).collect::<Vec<_>>();
    match app::config_from_env(&args) {
        Ok(Invocation::Help) => {
            println!("{}", app::usage_text());
            ExitCode::SUCCESS
        }
        Ok(Invocation::Run(config)) => {
            info!(ticks = config.ticks, tick_ms = config.tick_ms, "=== Mate Runner Startup ===");
            app::run(config, &mut io::stdout().lock())
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            eprintln!("{}", app::usage_text());
            ExitCode::FAILURE
        }
    }
}
