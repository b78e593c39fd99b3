use std::path::PathBuf;
use std::process;

use clap::Args;
use polyemit::codegen::GenOptions;
use polyemit::config::GenConfig;

use super::resolve_config;

#[derive(Args)]
pub struct BuildArgs {
    /// Program AST as JSON
    pub input: PathBuf,
    /// Target language: as, c or cl (overrides polyemit.toml)
    #[arg(short, long)]
    pub target: Option<String>,
    /// Output directory (as) or file (c, cl)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Package of the generated ActionScript classes
    #[arg(long)]
    pub namespace: Option<String>,
    /// Configuration file (default: nearest polyemit.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn cmd_build(args: BuildArgs) {
    let config = resolve_config(&args.input, args.config.as_deref());
    let options = resolve_options(&args, config.as_ref());

    let program = match polyemit::load_program(&args.input) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    let files = match polyemit::generate(&program, &options) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = polyemit::write_outputs(&files) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
    eprintln!(
        "Generated {} file(s) for target '{}' in {}",
        files.len(),
        options.target,
        options.output.display()
    );
}

/// Command-line flags win over the config file. The config's output path
/// only applies when the config's target is the one being built.
fn resolve_options(args: &BuildArgs, config: Option<&GenConfig>) -> GenOptions {
    let target = match (&args.target, config) {
        (Some(t), _) => t.clone(),
        (None, Some(c)) => c.target.clone(),
        (None, None) => {
            eprintln!("error: no target given (use --target or a polyemit.toml)");
            process::exit(1);
        }
    };
    let config = config.filter(|c| c.target == target);
    let output = args
        .output
        .clone()
        .or_else(|| config.map(|c| c.output.clone()))
        .unwrap_or_else(|| polyemit::default_output(&args.input, &target));
    let namespace = args
        .namespace
        .clone()
        .or_else(|| config.and_then(|c| c.namespace.clone()));
    GenOptions {
        target,
        output,
        namespace,
    }
}
