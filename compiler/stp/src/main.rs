//! Command-line front end for the Stp parsing engine: syntax checking,
//! tree dumps, canonical re-printing, and a small parse REPL.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use stp_ast::ast::ProgramNode;
use stp_ast::query::{NodeRef, SyntaxNode};
use stp_ast::source::program_to_source;
use stp_parser::parser::diagnostics::render_snippet;
use stp_parser::parser::{Diagnostic, Severity};
use stp_parser::{parse_source, parse_source_recovering, StpError};

#[derive(Debug, Parser)]
#[command(
    name = "stp",
    version,
    about = "Parser and syntax tools for the Stp matrix scripting language",
    long_about = "Parses Stp source files into syntax trees.\n\n\
        EXAMPLES:\n\
        \n  stp check script.stp            Syntax-check a file\n\
        \n  stp dump --format sexpr script.stp   Print the syntax tree\n\
        \n  stp fmt script.stp              Re-print the file from its tree\n\
        \n  echo 'x = 1' | stp check        Check code from stdin"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a source file and report every syntax error found
    Check(InputArgs),

    /// Print the syntax tree of a source file
    Dump(DumpArgs),

    /// Re-print a source file from its parsed tree
    Fmt(InputArgs),

    /// Interactively parse statements from stdin
    Repl,
}

#[derive(Debug, Args, Clone)]
struct InputArgs {
    /// Input Stp source file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
struct DumpArgs {
    /// Input Stp source file (reads from stdin if not provided)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format for the tree
    #[arg(long = "format", value_name = "FORMAT", value_parser = ["sexpr", "json"], default_value = "sexpr")]
    format: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let result = match cli.command {
        Command::Check(args) => cmd_check(&args),
        Command::Dump(args) => cmd_dump(&args),
        Command::Fmt(args) => cmd_fmt(&args),
        Command::Repl => cmd_repl(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(input: &Option<PathBuf>) -> io::Result<(String, String)> {
    match input {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok((path.display().to_string(), text))
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(("<stdin>".to_string(), text))
        }
    }
}

fn print_diagnostic(name: &str, source: &str, diag: &Diagnostic) {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Note => "note",
    };
    eprintln!(
        "{severity}: {} ({name}:{}:{})",
        diag.message, diag.span.line, diag.span.column
    );
    eprint!("{}", render_snippet(source, &diag.span));
    if let Some(help) = &diag.help {
        eprintln!("help: {help}");
    }
}

fn print_stp_error(name: &str, source: &str, err: &StpError) {
    let span = err.span();
    eprintln!("error: {err} ({name}:{}:{})", span.line, span.column);
    eprint!("{}", render_snippet(source, &span));
}

fn cmd_check(args: &InputArgs) -> io::Result<ExitCode> {
    let (name, source) = read_input(&args.input)?;
    let outcome = parse_source_recovering(&source);
    for diag in &outcome.diagnostics {
        print_diagnostic(&name, &source, diag);
    }
    if outcome.is_clean() {
        println!(
            "{name}: ok ({} top-level statements)",
            outcome.program.statements.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{name}: {} error(s)",
            outcome
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count()
        );
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_dump(args: &DumpArgs) -> io::Result<ExitCode> {
    let (name, source) = read_input(&args.input)?;
    match parse_source(&source) {
        Ok(program) => {
            if args.format == "json" {
                match serde_json::to_string_pretty(&program) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        return Ok(ExitCode::FAILURE);
                    }
                }
            } else {
                println!("{}", program_sexpr(&program));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_stp_error(&name, &source, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_fmt(args: &InputArgs) -> io::Result<ExitCode> {
    let (name, source) = read_input(&args.input)?;
    match parse_source(&source) {
        Ok(program) => {
            print!("{}", program_to_source(&program));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_stp_error(&name, &source, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}

// ---- S-expression rendering over the generic query surface ----

fn program_sexpr(program: &ProgramNode) -> String {
    let mut out = String::new();
    render_node(program, &mut out, 0);
    out
}

fn render_node<N: SyntaxNode + ?Sized>(node: &N, out: &mut String, indent: usize) {
    out.push('(');
    out.push_str(node.kind().as_str());
    if let Some(text) = node.text() {
        out.push_str(" \"");
        out.push_str(text);
        out.push('"');
    }
    for (name, field) in node.fields() {
        if let NodeRef::Token(token) = field {
            out.push(' ');
            out.push_str(name.as_str());
            out.push_str(": \"");
            out.push_str(token);
            out.push('"');
        }
    }
    for child in node.children() {
        out.push('\n');
        out.push_str(&"  ".repeat(indent + 1));
        render_ref(&child, out, indent + 1);
    }
    out.push(')');
}

fn render_ref(node_ref: &NodeRef<'_>, out: &mut String, indent: usize) {
    match node_ref {
        NodeRef::Expr(n) => render_node(*n, out, indent),
        NodeRef::Stmt(n) => render_node(*n, out, indent),
        NodeRef::Block(n) => render_node(*n, out, indent),
        NodeRef::Elseif(n) => render_node(*n, out, indent),
        NodeRef::Segment(n) => render_node(*n, out, indent),
        NodeRef::Row(n) => render_node(*n, out, indent),
        NodeRef::KeywordArg(n) => render_node(*n, out, indent),
        NodeRef::KeywordParam(n) => render_node(*n, out, indent),
        NodeRef::Ident(n) => {
            out.push_str("(identifier \"");
            out.push_str(&n.name);
            out.push_str("\")");
        }
        NodeRef::Number(n) => {
            out.push_str("(number ");
            out.push_str(&n.raw);
            out.push(')');
        }
        NodeRef::Token(token) => {
            out.push('"');
            out.push_str(token);
            out.push('"');
        }
        NodeRef::Exprs(list) => {
            for (i, n) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_node(n, out, indent);
            }
        }
        NodeRef::Segments(list) => {
            for (i, n) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_node(n, out, indent);
            }
        }
        NodeRef::Idents(list) => {
            for (i, n) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_ref(&NodeRef::Ident(n), out, indent);
            }
        }
        NodeRef::KeywordArgs(list) => {
            for (i, n) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_node(n, out, indent);
            }
        }
        NodeRef::KeywordParams(list) => {
            for (i, n) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                render_node(n, out, indent);
            }
        }
    }
}

// ---- REPL ----

fn cmd_repl() -> io::Result<ExitCode> {
    let stdin = io::stdin();
    let mut buffer = String::new();
    println!("Stp parse REPL. Enter statements; :quit exits.");
    loop {
        let prompt = if buffer.is_empty() { "stp> " } else { "...> " };
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if buffer.is_empty() && matches!(trimmed, ":q" | ":quit" | ":exit") {
            break;
        }

        buffer.push_str(&line);
        if !is_complete_input(&buffer) {
            continue;
        }

        let outcome = parse_source_recovering(&buffer);
        for diag in &outcome.diagnostics {
            print_diagnostic("<repl>", &buffer, diag);
        }
        if outcome.is_clean() {
            for stmt in &outcome.program.statements {
                let mut out = String::new();
                render_node(stmt, &mut out, 0);
                println!("{out}");
            }
        }
        buffer.clear();
    }
    Ok(ExitCode::SUCCESS)
}

/// A line-level heuristic for multi-line input: keep reading while
/// brackets are open or a string is unclosed.
fn is_complete_input(s: &str) -> bool {
    let mut paren: i32 = 0;
    let mut brace: i32 = 0;
    let mut bracket: i32 = 0;
    let mut in_str = false;
    let mut prev_backslash = false;

    for ch in s.chars() {
        if in_str {
            if prev_backslash {
                prev_backslash = false;
                continue;
            }
            if ch == '\\' {
                prev_backslash = true;
                continue;
            }
            if ch == '"' {
                in_str = false;
            }
            continue;
        }

        match ch {
            '"' => in_str = true,
            '(' => paren += 1,
            ')' => paren -= 1,
            '{' => brace += 1,
            '}' => brace -= 1,
            '[' => bracket += 1,
            ']' => bracket -= 1,
            _ => {}
        }
    }

    !in_str && paren <= 0 && brace <= 0 && bracket <= 0
}
