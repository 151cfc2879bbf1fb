use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    app::bootstrap::init_tracing();
    app::loop_runner::run(app::bootstrap::build_app())
}
