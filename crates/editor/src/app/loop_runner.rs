use std::process::ExitCode;

use engine::{run_app, AppError};
use tracing::error;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: Result<AppWiring, AppError>) -> ExitCode {
    let result = app.and_then(|app| run_app(app.config, app.engine));
    if let Err(err) = result {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
