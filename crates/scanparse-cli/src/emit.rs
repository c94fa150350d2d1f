//! A minimal stand-in for the language-specific code emitters spec section
//! 1 scopes out as an external collaborator. Writes one summary file per
//! requested target language, naming the artifact and its gross shape —
//! enough to prove the compiled data reached the boundary, nothing more.

use scanparse::parser::Parser;
use scanparse::scanner::Scanner;
use std::fs;
use std::io;
use std::path::PathBuf;

pub fn emit_scanner(scanner: &Scanner, target: &str, output_base: &str, force: bool) -> io::Result<PathBuf> {
    let path = PathBuf::from(format!("{output_base}.{target}.scanner.stub"));
    guard_overwrite(&path, force)?;
    let body = format!(
        "# generated by scanparse-cli (target: {target})\n\
         # scanner {:?}\n\
         # states={} accepting={} alphabet={} sink={}\n",
        scanner.name(),
        scanner.states().len(),
        scanner.accepting().len(),
        scanner.alphabet().len(),
        scanner.has_sink(),
    );
    fs::write(&path, body)?;
    Ok(path)
}

pub fn emit_parser(parser: &Parser, target: &str, output_base: &str, force: bool) -> io::Result<PathBuf> {
    let path = PathBuf::from(format!("{output_base}.{target}.parser.stub"));
    guard_overwrite(&path, force)?;
    let body = format!(
        "# generated by scanparse-cli (target: {target})\n\
         # parser {:?}\n\
         # nonterminals={} terminals={} rules={} conflicts={}\n",
        parser.name(),
        parser.nonterminals().len(),
        parser.terminals().len(),
        parser.rules().len(),
        parser.has_conflicts(),
    );
    fs::write(&path, body)?;
    Ok(path)
}

fn guard_overwrite(path: &PathBuf, force: bool) -> io::Result<()> {
    if !force && path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists; pass --force to overwrite", path.display()),
        ));
    }
    Ok(())
}
