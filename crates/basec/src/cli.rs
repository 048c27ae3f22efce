use std::fs;

use crate::diag::{Diag, Level};
use crate::parse_source;
use crate::sema;

const USAGE: &str = "usage: basec [--check] [--dump-ast] [--dump-table] <file>";

pub fn run<I>(args: I) -> i32
where
    I: IntoIterator<Item = String>,
{
    let mut check = false;
    let mut dump_ast = false;
    let mut dump_table = false;
    let mut path = None;

    for arg in args {
        match arg.as_str() {
            "--check" => check = true,
            "--dump-ast" => dump_ast = true,
            "--dump-table" => dump_table = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                return 0;
            }
            _ if arg.starts_with('-') => {
                eprintln!("unknown flag {arg}");
                eprintln!("{USAGE}");
                return 1;
            }
            _ => {
                if path.replace(arg).is_some() {
                    eprintln!("{USAGE}");
                    return 1;
                }
            }
        }
    }

    let Some(path) = path else {
        eprintln!("{USAGE}");
        return 1;
    };

    let src = match fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("failed to read {path}: {err}");
            return 1;
        }
    };

    let (mut program, parse_diags) = parse_source(&src);
    let failed = print_diags(&parse_diags);
    if failed {
        return 1;
    }

    if check || dump_table {
        let (analysis, diags) = sema::analyze_program(&mut program);
        let failed = print_diags(&diags);
        if failed {
            return 1;
        }
        if dump_table {
            println!("{}", analysis.globals.dump(&analysis.symbols));
        }
    }

    if dump_ast {
        println!("{program:#?}");
    }

    0
}

/// Print every diagnostic; returns whether any was an error.
fn print_diags(diags: &[Diag]) -> bool {
    for diag in diags {
        let level = match diag.level {
            Level::Error => "error",
            Level::Warning => "warning",
        };
        eprintln!(
            "{level}: {} ({},{})",
            diag.message, diag.pos.line, diag.pos.col
        );
    }
    diags.iter().any(|d| matches!(d.level, Level::Error))
}
