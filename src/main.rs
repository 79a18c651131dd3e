//! Gridcalc - a reactive cell grid driven from the command line

#[cfg(feature = "clipboard")]
mod clipboard;
mod config;
mod markdown;

use std::env;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use gridcalc_core::{CellRef, Document, GridcalcError};
use gridcalc_engine::engine::{FORMULA_MARKER, formula_body};

fn print_usage() {
    eprintln!("Usage: gridcalc [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Tab-separated cell inputs, pasted at A1");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula and print the result");
    eprintln!("  -o, --output <FILE>       Write the markdown table to a file");
    eprintln!("  --rows <N>                Grid height (default from config, 100)");
    eprintln!("  --cols <N>                Grid width (default from config, 26)");
    eprintln!("  --config <FILE>           Load settings from this TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    #[cfg(feature = "clipboard")]
    {
        eprintln!("  --from-clipboard          Read the input block from the system clipboard");
        eprintln!("  --copy <RANGE>            Copy the inputs of RANGE to the system clipboard");
    }
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Args {
    file_path: Option<PathBuf>,
    command: Option<String>,
    output_file: Option<PathBuf>,
    rows: Option<usize>,
    cols: Option<usize>,
    config_file: Option<PathBuf>,
    no_config: bool,
    from_clipboard: bool,
    copy_range: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => return Ok(None),
            "-c" | "--command" => parsed.command = Some(take_value(args, &mut i, "--command")?),
            "-o" | "--output" => {
                parsed.output_file = Some(PathBuf::from(take_value(args, &mut i, "--output")?))
            }
            "--rows" => {
                parsed.rows = Some(parse_size("--rows", &take_value(args, &mut i, "--rows")?)?)
            }
            "--cols" => {
                parsed.cols = Some(parse_size("--cols", &take_value(args, &mut i, "--cols")?)?)
            }
            "--config" => {
                parsed.config_file = Some(PathBuf::from(take_value(args, &mut i, "--config")?))
            }
            "--no-config" => parsed.no_config = true,
            #[cfg(feature = "clipboard")]
            "--from-clipboard" => parsed.from_clipboard = true,
            #[cfg(feature = "clipboard")]
            "--copy" => parsed.copy_range = Some(take_value(args, &mut i, "--copy")?),
            arg if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            arg => {
                if parsed.file_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                parsed.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }
    Ok(Some(parsed))
}

fn take_value(args: &[String], i: &mut usize, name: &str) -> Result<String, String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires a value", name))
}

fn parse_size(name: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} expects a positive integer, got '{}'", name, value)),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_usage();
            std::process::exit(1);
        }
    };

    let (config, warnings) = if args.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(args.config_file.as_deref())
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .init();
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let rows = args.rows.unwrap_or(config.grid.rows);
    let cols = args.cols.unwrap_or(config.grid.cols);
    log::debug!("grid size {}x{}", rows, cols);

    let code = if let Some(formula) = args.command.as_deref() {
        run_command(formula, rows, cols)
    } else {
        match run_grid(&args, rows, cols) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                1
            }
        }
    };
    std::process::exit(code);
}

/// Evaluate one formula at A1 of an empty grid. The marker is optional.
fn run_command(formula: &str, rows: usize, cols: usize) -> i32 {
    let input = if formula_body(formula).is_some() {
        formula.to_string()
    } else {
        format!("{}{}", FORMULA_MARKER, formula)
    };

    let mut doc = Document::new(rows, cols);
    let at = CellRef::new(0, 0);
    match doc.commit_edit(at, &input) {
        Ok(recalc) => {
            println!("{}", doc.display_value(at).unwrap_or_default());
            match recalc.value.error_code() {
                Some(code) => {
                    log::debug!("{} evaluated to {}", at, code);
                    1
                }
                None => 0,
            }
        }
        Err(e) => {
            if let GridcalcError::Commit(commit) = &e {
                println!("{}", commit.code());
            }
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Paste the input block at A1 and print the grid.
fn run_grid(args: &Args, rows: usize, cols: usize) -> anyhow::Result<i32> {
    let text = read_input(args)?;

    let mut doc = Document::new(rows, cols);
    let mut rejected = 0;
    for outcome in doc.paste(&text, CellRef::new(0, 0)) {
        if let Err(e) = outcome.result {
            eprintln!("{}: {}", outcome.cell_ref, e);
            rejected += 1;
        }
    }

    if let Some(range) = args.copy_range.as_deref() {
        copy_to_clipboard(&doc, range)?;
    }

    match args.output_file.as_ref() {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            markdown::write_markdown(&mut file, &doc)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            markdown::write_markdown(&mut out, &doc)?;
            out.flush()?;
        }
    }

    Ok(if rejected > 0 { 1 } else { 0 })
}

fn read_input(args: &Args) -> anyhow::Result<String> {
    if args.from_clipboard {
        return read_clipboard();
    }
    let Some(path) = args.file_path.as_ref() else {
        bail!("no input: pass a FILE or --command (see --help)");
    };
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(feature = "clipboard")]
fn read_clipboard() -> anyhow::Result<String> {
    use gridcalc_core::ClipboardProvider;
    clipboard::SystemClipboard
        .get_text()
        .context("system clipboard holds no text")
}

#[cfg(not(feature = "clipboard"))]
fn read_clipboard() -> anyhow::Result<String> {
    bail!("built without clipboard support")
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(doc: &Document, range: &str) -> anyhow::Result<()> {
    use gridcalc_core::ClipboardProvider;
    let range = gridcalc_core::CellRange::parse(range).with_context(|| format!("bad range '{}'", range))?;
    let text = doc.copy_range(range)?;
    if !clipboard::SystemClipboard.set_text(text) {
        bail!("could not write to the system clipboard");
    }
    log::info!("copied {} to the clipboard", range);
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_doc: &Document, _range: &str) -> anyhow::Result<()> {
    bail!("built without clipboard support")
}
