use std::process::ExitCode;

use bpa_predict::cli::Cli;
use bpa_predict::paths::SearchRoots;
use bpa_predict::{Envelope, RunError};
use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;

fn main() -> ExitCode {
    // Logs go to stderr; RUST_LOG unset prints errors only, which we never log.
    env_logger::init();

    let envelope = match Cli::try_parse() {
        Ok(cli) => match bpa_predict::run(&cli, &SearchRoots::discover()) {
            Ok(label) => Envelope::success(label),
            Err(err) => {
                log::debug!("run failed ({:?})", err.kind());
                Envelope::failure(err)
            }
        },
        Err(err)
            if matches!(
                err.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let message = err.render().to_string().trim().to_string();
            Envelope::failure(RunError::Argument(message))
        }
    };

    // Nothing sensible remains to do if the host closed our stdio.
    let _ = envelope.emit();
    ExitCode::from(envelope.exit_code())
}
