use clap::Parser;
use proxyctl::cli::Cli;
use proxyctl::commands;
use proxyctl::domain::models::Invocation;
use proxyctl::services::output;

fn main() {
    let cli = Cli::parse();
    let result = Invocation::from_env().and_then(|inv| commands::dispatch(&inv, &cli));
    if let Err(err) = result {
        output::emit_error(cli.json, &err);
        std::process::exit(1);
    }
}
