//! Interactive order book shell.
//!
//! Reads one command per line from stdin. Book settings come from
//! `MATCHBOOK_TICK_SIZE` and `MATCHBOOK_ALLOW_SIDE_CHANGE`, log verbosity from
//! `RUST_LOG`.

use std::io::{self, BufRead, Write};

use tracing::info;
use tracing_subscriber::EnvFilter;

use matchbook::shell::{Flow, Shell, DIVIDER};
use matchbook::{BookConfig, OrderBook};

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = BookConfig::from_env()?;
    let mut shell = Shell::new(OrderBook::with_config(config)?);
    info!("Shell started");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "\n===== ORDERBOOK ENGINE =====\n")?;
    writeln!(stdout, "Type 'help' for available commands or 'quit' to exit")?;
    writeln!(stdout, "{}", DIVIDER)?;

    let mut lines = stdin.lock().lines();
    loop {
        writeln!(stdout, "Current orderbook size: {} orders", shell.book().len())?;
        write!(stdout, "\nEnter command: ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        writeln!(stdout, "{}", DIVIDER)?;
        let flow = shell.run_line(&line, &mut stdout)?;
        writeln!(stdout, "{}", DIVIDER)?;

        if flow == Flow::Exit {
            break;
        }
    }

    writeln!(stdout, "\nExiting Orderbook Engine. Goodbye!")?;
    Ok(())
}
