#![allow(clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use symgen_cli::args::CliArgs;
use symgen_cli::config::Configuration;
use symgen_cli::generator::{GenerationOptions, Generator};
use symgen_cli::json_provider::JsonSymbolProvider;
use symgen_cli::reporter;
use symgen_cli::tracing_config;
use symgen_common::GenerationFlags;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    tracing_config::init(args.verbose);

    match run(&args) {
        Ok(errors) if errors == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> anyhow::Result<usize> {
    let config = Configuration::load(&args.config)
        .with_context(|| format!("loading configuration `{}`", args.config.display()))?;

    let mut extra_flags = GenerationFlags::empty();
    if args.single_file {
        extra_flags |= GenerationFlags::SINGLE_FILE_EXPORT;
    }

    let provider = JsonSymbolProvider::new();
    let generator = Generator::new(&config, &provider);
    let output = generator
        .generate(&GenerationOptions {
            out_dir: Some(args.out_dir.clone()),
            extra_flags,
        })
        .context("generation failed")?;

    let errors = reporter::report(&output.diagnostics);
    eprintln!(
        "generated {} file(s) from {} user type(s)",
        output.files.len(),
        output.user_types
    );
    Ok(errors)
}
