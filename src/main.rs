use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use env_logger::Env;

use imcluster::Opts;
use imcluster::cli::SubCommandExtend;
use imcluster::error::{exit, exit_code};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::SUCCESS,
                ErrorKind::InvalidSubcommand
                | ErrorKind::MissingSubcommand
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => exit::MODE,
                _ => exit::ARGUMENT,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    match opts.subcmd.run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERR] {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}
