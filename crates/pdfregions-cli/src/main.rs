mod batch_cmd;
mod capture_cmd;
mod cli;
mod console;
mod shared;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Usage errors exit 1; --help and --version exit 0.
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        }
    };
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Capture(ref args) => capture_cmd::run(args),
        Commands::Batch(ref args) => batch_cmd::run(args),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
