//! `jsrt`: evaluate script files, or drop into an interactive REPL when
//! none are given. Grounded on `boa_cli`'s file-vs-REPL split, rebuilt
//! over `clap`'s derive API (rather than `structopt`) and `jsrt_engine`'s
//! `Context::eval`.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser as ClapParser;
use colored::Colorize;
use jsrt_engine::Context;
use rustyline::{error::ReadlineError, DefaultEditor};

/// CLI configuration for `jsrt`.
#[derive(Debug, ClapParser)]
#[command(author, version, about = "A JavaScript REPL and script runner", name = "jsrt")]
struct Opt {
    /// The JavaScript file(s) to evaluate. With no files, starts a REPL.
    files: Vec<PathBuf>,

    /// Print the parsed IR instead of evaluating.
    #[arg(long, short = 'a')]
    dump_ast: bool,
}

fn dump_ast(src: &str) {
    let mut interner = jsrt_interner::Interner::new();
    match jsrt_parser::parse(src, &mut interner) {
        Ok(program) => println!("{program:#?}"),
        Err(e) => eprintln!("{}", format!("SyntaxError: {e}").red()),
    }
}

fn run_file(ctx: &mut Context, path: &PathBuf, args: &Opt) -> bool {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => {
            eprintln!("{}", format!("{}: {e}", path.display()).red());
            return false;
        }
    };
    if args.dump_ast {
        dump_ast(&src);
        return true;
    }
    match ctx.eval(&src) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            false
        }
    }
}

fn repl(ctx: &mut Context, args: &Opt) -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    println!("{}", "jsrt — type an expression, Ctrl-D to exit".dimmed());
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                editor.add_history_entry(line.as_str()).ok();
                if args.dump_ast {
                    dump_ast(&line);
                    continue;
                }
                match ctx.eval(&line) {
                    Ok(value) => println!("{}", value.to_display_string()),
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Opt::parse();
    let mut ctx = Context::new();

    if args.files.is_empty() {
        if let Err(e) = repl(&mut ctx, &args) {
            eprintln!("{}", e.to_string().red());
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    for file in &args.files {
        if !run_file(&mut ctx, file, &args) {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
