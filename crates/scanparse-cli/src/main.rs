mod emit;
mod regex_text;
mod spec_file;

use clap::Parser as ClapParser;
use scanparse::parser::Parser as ScanparseParser;
use scanparse::scanner::Scanner;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Compiles scanner and parser specifications into DFA/LL(1) artifacts and
/// hands them to a target-language emitter.
#[derive(Debug, ClapParser)]
#[command(name = "scanparse-cli", version)]
struct Args {
    /// Target language name(s) to generate output for.
    #[arg(short = 'g', long = "generate", required = true, num_args = 1..)]
    generate: Vec<String>,

    /// Base filename for generated output.
    #[arg(short = 'o', long = "output", default_value = "out")]
    output: String,

    /// Path to a scanner specification file.
    #[arg(short = 's', long = "scanner")]
    scanner: Option<PathBuf>,

    /// Path to a parser specification file.
    #[arg(short = 'p', long = "parser")]
    parser: Option<PathBuf>,

    /// Overwrite existing output files.
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Print compilation timing.
    #[arg(short = 't', long = "time")]
    time: bool,

    /// Print extra diagnostic detail.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    SpecFile(#[from] spec_file::SpecFileError),
    #[error(transparent)]
    RegexText(#[from] regex_text::RegexTextError),
    #[error(transparent)]
    Compile(#[from] scanparse::CompileError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("neither --scanner nor --parser was given; nothing to generate")]
    NothingToGenerate,
}

fn main() {
    // spec section 9: the legacy CLI swallows all exceptions and always
    // exits 0; reproduced only here, never inside the core.
    let args = Args::parse();
    if let Err(err) = run(&args) {
        println!("scanparse-cli: {err}");
    }
    std::process::exit(0);
}

fn run(args: &Args) -> Result<(), CliError> {
    if args.scanner.is_none() && args.parser.is_none() {
        return Err(CliError::NothingToGenerate);
    }

    let scanner = match &args.scanner {
        Some(path) => Some(compile_scanner(path, args.verbose, args.time)?),
        None => None,
    };
    let parser = match &args.parser {
        Some(path) => Some(compile_parser(path, args.verbose, args.time)?),
        None => None,
    };

    for target in &args.generate {
        if let Some(scanner) = &scanner {
            let written = emit::emit_scanner(scanner, target, &args.output, args.force)?;
            println!("wrote {}", written.display());
        }
        if let Some(parser) = &parser {
            let written = emit::emit_parser(parser, target, &args.output, args.force)?;
            println!("wrote {}", written.display());
        }
    }

    Ok(())
}

fn compile_scanner(path: &PathBuf, verbose: bool, time: bool) -> Result<Scanner, CliError> {
    let start = Instant::now();
    let (name, rules) = spec_file::read(path)?;
    let mut patterns = Vec::with_capacity(rules.len());
    for (rule_name, body) in rules {
        let atoms = regex_text::parse(&body)?;
        patterns.push((rule_name, atoms));
    }
    let scanner = Scanner::new(name, patterns)?;
    if verbose {
        println!(
            "scanner {:?}: {} states, {} accepting",
            scanner.name(),
            scanner.states().len(),
            scanner.accepting().len()
        );
    }
    if time {
        report_timing("scanner", start);
    }
    Ok(scanner)
}

fn compile_parser(path: &PathBuf, verbose: bool, time: bool) -> Result<ScanparseParser, CliError> {
    let start = Instant::now();
    let (name, rules) = spec_file::read(path)?;
    let production_start = rules
        .first()
        .map(|(nt, _)| nt.clone())
        .ok_or(CliError::NothingToGenerate)?;
    let parser = ScanparseParser::new(name, rules, production_start)?;
    if verbose {
        println!(
            "parser {:?}: {} rules, conflicts={}",
            parser.name(),
            parser.rules().len(),
            parser.has_conflicts()
        );
    }
    if time {
        report_timing("parser", start);
    }
    Ok(parser)
}

fn report_timing(stage: &str, start: Instant) {
    println!("{stage} compiled in {:?}", start.elapsed());
}
