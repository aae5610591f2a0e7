use std::env;
use std::path::Path;
use std::process::ExitCode;

use qwop::QwopStage;
use ragdoll_core::{logging, App, SandboxConfig};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(Path::new);

    let config = match SandboxConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sandbox: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log_filter);
    tracing::info!(config = ?config_path, mode = ?config.input_mode, "starting sandbox");

    let stage = QwopStage::new(&config);
    if let Err(err) = App::new(&config).run(stage) {
        tracing::error!(%err, "sandbox stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
