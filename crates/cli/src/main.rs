mod config;
mod demos;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use lang_check::Specializer;
use lang_ty::Ty;
use miette::{Diagnostic, IntoDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Type specializer for rank-polymorphic array functions")]
struct Cli {
    /// Path to a rankjit.toml. Defaults to the nearest one above the working
    /// directory.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the demo functions
    List,

    /// Specialize a demo function and print the typed result
    Specialize {
        /// Name of the function, see `rankjit list`
        func: String,

        /// Argument types, e.g. "array<f64, 1>" i64. Defaults to the demo's
        /// example signature.
        types: Vec<String>,
    },
}

/// A type signature that failed to parse, rendered against its source.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid type signature")]
struct SignatureError {
    #[source_code]
    src: NamedSource<String>,

    #[label("{reason}")]
    at: SourceSpan,

    reason: String,
}

impl SignatureError {
    fn new(name: &str, src: &str, err: &sig_parser::SigError) -> Self {
        let (start, end) = err.span();
        Self {
            src: NamedSource::new(name, src.to_string()),
            at: (start, end.saturating_sub(start)).into(),
            reason: err.to_string(),
        }
    }
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::List => {
            for demo in demos::CATALOG {
                println!("{:<14} {:<36} {}", demo.name, demo.example_args, demo.about);
            }
            Ok(())
        }
        Command::Specialize { func, types } => {
            let config = config::resolve(args.config.as_deref())?;
            run_specialize(config, &func, &types)
        }
    }
}

fn run_specialize(config: lang_check::Config, func: &str, types: &[String]) -> miette::Result<()> {
    let spec = Specializer::with_config(config);
    for def in demos::functions() {
        spec.register(def).into_diagnostic()?;
    }

    let arg_types = if types.is_empty() {
        let demo = demos::find(func)
            .ok_or_else(|| miette::miette!("no argument types given and `{func}` has no example"))?;
        parse_list(demo.example_args)?
    } else {
        types
            .iter()
            .enumerate()
            .map(|(i, src)| parse_arg(i, src))
            .collect::<miette::Result<Vec<_>>>()?
    };

    let typed = spec.specialize(func, &arg_types).into_diagnostic()?;
    print!("{typed}");

    let stats = spec.stats();
    log::info!(
        "{} inferences, {} cache hits, {} memo hits",
        stats.inferences,
        stats.cache_hits,
        stats.memo_hits
    );
    Ok(())
}

fn parse_arg(pos: usize, src: &str) -> miette::Result<Ty> {
    sig_parser::parse_ty(src)
        .map_err(|err| SignatureError::new(&format!("argument {}", pos + 1), src, &err).into())
}

fn parse_list(src: &str) -> miette::Result<Vec<Ty>> {
    sig_parser::parse_tys(src).map_err(|err| SignatureError::new("example", src, &err).into())
}
