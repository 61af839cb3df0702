use std::process::ExitCode;

use apk_puller::{
    AdbBridge, Prompter, PullOptions, Puller, cli::Cli, logging::setup_logging,
    settings::load_settings,
};
use mimalloc::MiMalloc;
use tracing::{debug, info};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to setup logging: {e:#}");
    }

    let mut settings = load_settings(cli.config.as_deref());
    if let Some(adb_path) = &cli.adb_path {
        settings.adb_path = adb_path.clone();
    }
    debug!(?cli, ?settings, "Starting apk-puller");

    let selection = cli.selection();
    let options = PullOptions {
        output_dir: cli.output_dir,
        package_command: settings.package_command.clone(),
    };
    let mut puller = Puller::new(AdbBridge::new(&settings), Prompter::stdio(), options);

    match puller.run(&selection).await {
        Ok(report) => {
            info!(destination = %report.destination.display(), "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
