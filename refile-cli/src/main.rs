use clap::Parser;
use std::process;

mod cli;
mod run;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    match run::handle_run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        },
    }
}
