use crate::console::ConsoleHost;
use crate::render;
use matcalc_engine::{Catalog, EvalOptions, Session};
use matcalc_store::VariableStore;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// What one line of REPL input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank lines and `#` or `//` comments.
    Skip,
    Directive(Directive),
    Expression(&'a str),
}

/// A `:`-prefixed REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Help(Option<String>),
    Vars,
    Save {
        file: Option<PathBuf>,
        names: Vec<String>,
    },
    Load {
        file: Option<PathBuf>,
        names: Vec<String>,
    },
    Exit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return Line::Skip;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return Line::Expression(line);
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let rest: Vec<String> = words.map(str::to_string).collect();
    let file_and_names = |mut rest: Vec<String>| {
        if rest.is_empty() {
            return (None, rest);
        }
        let file = PathBuf::from(rest.remove(0));
        (Some(file), rest)
    };

    let directive = match name {
        "help" | "h" | "?" => Directive::Help((!rest.is_empty()).then(|| rest.join(" "))),
        "vars" => Directive::Vars,
        "save" => {
            let (file, names) = file_and_names(rest);
            Directive::Save { file, names }
        }
        "load" => {
            let (file, names) = file_and_names(rest);
            Directive::Load { file, names }
        }
        "exit" | "quit" | "q" => Directive::Exit,
        other => Directive::Unknown(other.to_string()),
    };
    Line::Directive(directive)
}

pub fn run(options: EvalOptions) -> anyhow::Result<()> {
    let host = ConsoleHost::new()?;
    let mut session = Session::new(host, options);
    log::info!("REPL ready");

    println!("matcalc {}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for the list of commands, :exit to quit.");
    println!();

    loop {
        let line = match session.host_mut().read_line("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        session.host_mut().add_history(&line);

        match parse_line(&line) {
            Line::Skip => {}
            Line::Expression(source) => evaluate_line(&mut session, source),
            Line::Directive(Directive::Exit) => break,
            Line::Directive(directive) => {
                if let Err(e) = run_directive(&mut session, directive) {
                    println!("error: {:#}", e);
                }
            }
        }
    }

    println!("Bye!");
    Ok(())
}

fn evaluate_line(session: &mut Session<ConsoleHost>, source: &str) {
    match session.run(source) {
        Ok(Some(value)) => println!("{}", render::value(&value)),
        Ok(None) => {}
        Err(e) => {
            println!("{}", render::error_report(source, &e));
            println!("Variables were left unchanged.");
        }
    }
}

fn store_path(file: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    file.or_else(VariableStore::default_path)
        .ok_or_else(|| anyhow::anyhow!("no file given and no default data directory"))
}

fn run_directive(
    session: &mut Session<ConsoleHost>,
    directive: Directive,
) -> anyhow::Result<()> {
    match directive {
        Directive::Help(None) => {
            println!("Expressions are evaluated as you type them; `_` holds the last result.");
            println!("Directives: :help [topic], :vars, :save [file] [names], :load [file] [names], :exit");
            println!();
            print!("{}", render::catalog(Catalog::standard()?));
        }
        Directive::Help(Some(topic)) => match Catalog::standard()?.find(&topic) {
            Some(command) => print!("{}", render::command(command)),
            None => println!("No command matches `{}`.", topic),
        },
        Directive::Vars => {
            let names = session.context().list_variables();
            if names.is_empty() {
                println!("No variables.");
            }
            let selection = VariableStore::capture(session.context(), &names);
            for (name, value) in &selection.store.variables {
                println!("{} = {}", name, value);
            }
        }
        Directive::Save { file, names } => {
            let path = store_path(file)?;
            let selection = VariableStore::capture(session.context(), &names);
            report_missing(&selection.missing);
            selection.store.save_to_path(&path)?;
            println!("Saved {} variables to {}.", selection.store.len(), path.display());
        }
        Directive::Load { file, names } => {
            let path = store_path(file)?;
            let selection = VariableStore::load_from_path(&path)?.select(&names);
            report_missing(&selection.missing);
            let count = selection.store.len();
            selection.store.restore(session.context_mut());
            println!("Loaded {} variables from {}.", count, path.display());
        }
        Directive::Exit => {}
        Directive::Unknown(name) => println!("Unknown command `:{}`. Try :help.", name),
    }
    Ok(())
}

fn report_missing(missing: &[String]) {
    if !missing.is_empty() {
        println!("Not found: {}", missing.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_lines() {
        assert_eq!(parse_line(""), Line::Skip);
        assert_eq!(parse_line("   "), Line::Skip);
        assert_eq!(parse_line("# note"), Line::Skip);
        assert_eq!(parse_line("  // note"), Line::Skip);
    }

    #[test]
    fn test_expressions_are_passed_through() {
        assert_eq!(parse_line("$a + 1"), Line::Expression("$a + 1"));
    }

    #[test]
    fn test_directives() {
        assert_eq!(parse_line(":help"), Line::Directive(Directive::Help(None)));
        assert_eq!(
            parse_line(":help canonical form"),
            Line::Directive(Directive::Help(Some("canonical form".into())))
        );
        assert_eq!(parse_line(":vars"), Line::Directive(Directive::Vars));
        assert_eq!(parse_line(" :exit "), Line::Directive(Directive::Exit));
        assert_eq!(
            parse_line(":frobnicate"),
            Line::Directive(Directive::Unknown("frobnicate".into()))
        );
    }

    #[test]
    fn test_save_and_load_arguments() {
        assert_eq!(
            parse_line(":save vars.json a b"),
            Line::Directive(Directive::Save {
                file: Some(PathBuf::from("vars.json")),
                names: vec!["a".into(), "b".into()],
            })
        );
        assert_eq!(
            parse_line(":load"),
            Line::Directive(Directive::Load {
                file: None,
                names: Vec::new(),
            })
        );
    }
}
