use {clap::Parser, std::process::ExitCode};

fn main() -> ExitCode {
    let args = inspector::arguments::Arguments::parse();
    observe::tracing::initialize(&observe::Config::new(
        &args.log_filter,
        Some(args.log_stderr_threshold),
        args.use_json_logs,
    ));
    tracing::debug!("running fusion-inspect with arguments:\n{}", args);

    match inspector::run(args, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(?err, "fusion-inspect failed");
            ExitCode::FAILURE
        }
    }
}
