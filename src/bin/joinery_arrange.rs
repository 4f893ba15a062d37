//!
//! Joinery arrange binary
//! ----------------------
//! Loads a join tree from a JSON spec, reads a JSON array of flat rows from a
//! file or stdin, and prints the arranged records as pretty JSON.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use joinery::config::{load_join_spec, JOIN_SPEC_ENV};
use joinery::row::{rows_from_value, Row};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --join <spec.json> [--rows <rows.json>]\n  {program} -j <spec.json> < rows.json\n\nThe join spec may also be given through {JOIN_SPEC_ENV}. Rows are read from stdin when --rows is omitted."
    );
}

#[derive(Debug, PartialEq)]
struct Args {
    join: PathBuf,
    rows: Option<PathBuf>,
}

/// Parse command-line arguments (without the program name). `env_join` is the
/// value of `JOINERY_JOIN_SPEC`, overridden by `--join`. `Ok(None)` means help
/// was requested.
fn parse_args<I>(args: I, env_join: Option<PathBuf>) -> Result<Option<Args>>
where
    I: IntoIterator<Item = String>,
{
    let mut join = env_join;
    let mut rows: Option<PathBuf> = None;
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--join" | "-j" => join = Some(it.next().ok_or_else(|| anyhow!("--join needs a path"))?.into()),
            "--rows" | "-r" => rows = Some(it.next().ok_or_else(|| anyhow!("--rows needs a path"))?.into()),
            "--help" | "-h" => return Ok(None),
            other => return Err(anyhow!("unknown argument '{}'", other)),
        }
    }
    let join = join.ok_or_else(|| anyhow!("no join spec given"))?;
    Ok(Some(Args { join, rows }))
}

fn read_rows(path: Option<&PathBuf>) -> Result<Vec<Row>> {
    let text = match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading rows {}", p.display()))?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s).context("reading rows from stdin")?;
            s
        }
    };
    Ok(rows_from_value(serde_json::from_str(&text).context("rows are not valid JSON")?)?)
}

/// Arrange the rows named by `args` and render the result as pretty JSON.
fn run(args: &Args) -> Result<String> {
    let join = load_join_spec(&args.join).with_context(|| format!("loading join spec {}", args.join.display()))?;
    let rows = read_rows(args.rows.as_ref())?;
    info!(target: "joinery", "arranging {} rows with joins {:?}", rows.len(), join.join_ids());
    let records = join.arrange_flat_data(&rows)?;
    Ok(serde_json::to_string_pretty(&records)?)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let program = env::args().next().unwrap_or_else(|| "joinery_arrange".to_string());
    let args = match parse_args(env::args().skip(1), env::var(JOIN_SPEC_ENV).ok().map(PathBuf::from)) {
        Ok(Some(args)) => args,
        Ok(None) => { print_usage(&program); return Ok(()); }
        Err(e) => { print_usage(&program); return Err(e); }
    };
    println!("{}", run(&args)?);
    Ok(())
}
