mod eval;
mod index;
mod search;

pub use eval::{run_eval, EvalArgs};
pub use index::{run_index, IndexArgs};
pub use search::{run_search, SearchArgs};

use anyhow::Result;
use std::io::{self, Write};

/// Print a JSON document to stdout, tolerating a closed pipe (`head`, etc).
/// Stdout carries only JSON; logs go to stderr.
pub fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}
