use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(
    name = "polyemit",
    version,
    about = "Emit ActionScript, C and OpenCL C from a typed program"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate target sources from a program (JSON)
    Build(cli::build::BuildArgs),
    /// List the supported targets
    Targets,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => cli::build::cmd_build(args),
        Command::Targets => cli::targets::cmd_targets(),
    }
}
