//! Line-based command shell around [`OrderBook`].
//!
//! The shell only talks to the book through its public operations. It owns
//! the order-id counter; the book never mints ids itself.

use std::io::Write;

use eyre::WrapErr;
use tracing::debug;

use crate::error::OrderBookResult;
use crate::order::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
use crate::order_book::OrderBook;
use crate::trade::Trades;

pub const DIVIDER: &str = "---------------------------------------------";

const HELP: &str = "\
Available commands:
  buy <price> <quantity> [FAK]        - Place a buy order
  sell <price> <quantity> [FAK]       - Place a sell order
  cancel <orderid>                    - Cancel an order
  modify <orderid> <price> <quantity> - Modify an order
  clear                               - Clear all orders
  quit/exit                           - Exit the program";

/// Hands out sequential order ids, starting at 1.
#[derive(Debug)]
pub struct OrderIdGenerator {
    next_id: OrderId,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: OrderId) -> Self {
        Self { next_id: first }
    }

    pub fn next_id(&mut self) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Place {
        side: Side,
        price: Price,
        quantity: Quantity,
        order_type: OrderType,
    },
    Cancel(OrderId),
    Modify {
        order_id: OrderId,
        price: Price,
        quantity: Quantity,
    },
    Clear,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> eyre::Result<Self> {
        let mut words = line.split_whitespace();
        let action = words.next().ok_or_else(|| eyre::eyre!("Empty command"))?;

        let command = match action {
            "quit" | "exit" => Command::Quit,
            "help" => Command::Help,
            "clear" => Command::Clear,
            "buy" | "sell" => {
                let side = if action == "buy" { Side::Buy } else { Side::Sell };
                let price: Price = next_arg(&mut words, "price")?;
                let quantity: Quantity = next_arg(&mut words, "quantity")?;
                let order_type = match words.next() {
                    Some("FAK") => OrderType::FillAndKill,
                    _ => OrderType::GoodTillCancel,
                };
                Command::Place {
                    side,
                    price,
                    quantity,
                    order_type,
                }
            }
            "cancel" => Command::Cancel(next_arg(&mut words, "order ID")?),
            "modify" => Command::Modify {
                order_id: next_arg(&mut words, "order ID")?,
                price: next_arg(&mut words, "price")?,
                quantity: next_arg(&mut words, "quantity")?,
            },
            _ => {
                return Err(eyre::eyre!(
                    "Unknown command. Type 'help' for available commands."
                ))
            }
        };

        Ok(command)
    }
}

fn next_arg<'a, T, I>(words: &mut I, name: &str) -> eyre::Result<T>
where
    I: Iterator<Item = &'a str>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = words
        .next()
        .ok_or_else(|| eyre::eyre!("Invalid {}: missing", name))?;
    raw.parse()
        .map_err(|e| eyre::eyre!("Invalid {} {:?}: {}", name, raw, e))
}

/// Whether the shell should keep reading commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs commands against a book and reports to `out`.
#[derive(Debug)]
pub struct Shell {
    book: OrderBook,
    ids: OrderIdGenerator,
}

impl Shell {
    pub fn new(book: OrderBook) -> Self {
        Self {
            book,
            ids: OrderIdGenerator::new(),
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Parse and run one line. Bad input is reported to `out`, not returned.
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> eyre::Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.execute(command, out),
            Err(err) => {
                debug!("Rejected input {:?}: {}", line, err);
                writeln!(out, "Error: {}", err)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> eyre::Result<Flow> {
        match command {
            Command::Quit => return Ok(Flow::Exit),
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Place {
                side,
                price,
                quantity,
                order_type,
            } => {
                let order_id = self.ids.next_id();
                writeln!(
                    out,
                    "Creating {} order ID: {}, Price: {}, Quantity: {}, Type: {}",
                    side, order_id, price, quantity, order_type
                )?;

                match Order::new(order_type, order_id, side, price, quantity) {
                    Ok(order) => report(out, self.book.try_add_order(order))?,
                    Err(err) => writeln!(out, "Error: {}", err)?,
                }
            }
            Command::Cancel(order_id) => {
                writeln!(out, "Canceling order ID: {}", order_id)?;
                self.book.cancel_order(order_id);
            }
            Command::Modify {
                order_id,
                price,
                quantity,
            } => {
                writeln!(out, "Finding order ID: {} to modify", order_id)?;
                if self.book.find_order(order_id).is_none() {
                    writeln!(out, "Error: Order ID {} not found", order_id)?;
                    return Ok(Flow::Continue);
                }

                writeln!(
                    out,
                    "Modifying order ID: {}, New Price: {}, New Quantity: {}",
                    order_id, price, quantity
                )?;
                let request = OrderModify::new(order_id, price, quantity);
                report(out, self.book.try_modify_order(request))?;
            }
            Command::Clear => {
                writeln!(out, "Clearing all orders")?;
                self.book.clear_all();
            }
        }

        Ok(Flow::Continue)
    }
}

/// Print the trades, or why the book declined the request. Only a fatal
/// book error is returned.
fn report(out: &mut impl Write, result: OrderBookResult<Trades>) -> eyre::Result<()> {
    match result {
        Ok(trades) => write_trades(out, &trades),
        Err(err) if err.is_fatal() => Err(err).wrap_err("matching failed"),
        Err(err) => {
            writeln!(out, "Error: {}", err)?;
            Ok(())
        }
    }
}

fn write_trades(out: &mut impl Write, trades: &Trades) -> eyre::Result<()> {
    if trades.is_empty() {
        return Ok(());
    }

    writeln!(out, "Generated {} trade(s):", trades.len())?;
    for trade in trades {
        writeln!(out, "{}", trade)?;
        writeln!(out, "{}", DIVIDER)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run(shell: &mut Shell, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = shell.run_line(line, &mut out).expect("no fault");
        (flow, String::from_utf8(out).expect("utf8 output"))
    }

    #[test]
    fn test_id_generator() {
        let mut ids = OrderIdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(OrderIdGenerator::starting_at(100).next_id(), 100);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("buy 100.50 10").expect("valid"),
            Command::Place {
                side: Side::Buy,
                price: dec!(100.50),
                quantity: 10,
                order_type: OrderType::GoodTillCancel,
            }
        );
        assert_eq!(
            Command::parse("  sell 99 5 FAK ").expect("valid"),
            Command::Place {
                side: Side::Sell,
                price: dec!(99),
                quantity: 5,
                order_type: OrderType::FillAndKill,
            }
        );
        assert_eq!(
            Command::parse("modify 3 21.00 12").expect("valid"),
            Command::Modify {
                order_id: 3,
                price: dec!(21.00),
                quantity: 12,
            }
        );
        assert_eq!(Command::parse("cancel 7").expect("valid"), Command::Cancel(7));
        assert_eq!(Command::parse("exit").expect("valid"), Command::Quit);
        assert_eq!(Command::parse("clear").expect("valid"), Command::Clear);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("").is_err());
        assert!(Command::parse("buy").is_err());
        assert!(Command::parse("buy abc 10").is_err());
        assert!(Command::parse("sell 10 -5").is_err());
        assert!(Command::parse("cancel x").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn test_session() {
        let mut shell = Shell::new(OrderBook::default());

        let (_, output) = run(&mut shell, "buy 20 10");
        assert_eq!(
            output,
            "Creating Buy order ID: 1, Price: 20, Quantity: 10, Type: GTC\n"
        );

        let (_, output) = run(&mut shell, "sell 20 4");
        assert!(output.contains("Generated 1 trade(s):"));
        assert!(output.contains("  Bid Order ID: 1, Price: 20.00, Quantity: 4"));
        assert!(output.contains("  Ask Order ID: 2, Price: 20.00, Quantity: 4"));
        assert_eq!(shell.book().len(), 1);

        let (_, output) = run(&mut shell, "modify 1 19.5 8");
        assert!(output.contains("Modifying order ID: 1, New Price: 19.5, New Quantity: 8"));
        assert_eq!(shell.book().best_bid(), Some(dec!(19.5)));

        let (_, output) = run(&mut shell, "modify 99 1 1");
        assert!(output.contains("Error: Order ID 99 not found"));

        run(&mut shell, "cancel 1");
        assert!(shell.book().is_empty());

        let (flow, _) = run(&mut shell, "quit");
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn test_bad_input_is_reported() {
        let mut shell = Shell::new(OrderBook::default());

        let (flow, output) = run(&mut shell, "buy 10");
        assert_eq!(flow, Flow::Continue);
        assert!(output.starts_with("Error: Invalid quantity"));

        let (_, output) = run(&mut shell, "buy 10 0");
        assert!(output.contains("Error: quantity must be positive"));
        assert!(shell.book().is_empty());

        let (_, output) = run(&mut shell, "help");
        assert!(output.starts_with("Available commands:"));

        run(&mut shell, "sell 10 5");
        run(&mut shell, "clear");
        assert!(shell.book().is_empty());
    }

    #[test]
    fn test_declined_orders_are_reported() {
        let mut shell = Shell::new(OrderBook::default());

        let (_, output) = run(&mut shell, "buy 100.005 10");
        assert!(output.contains("Error: price 100.005 is not a multiple of tick size 0.01"));
        assert!(shell.book().is_empty());

        let (_, output) = run(&mut shell, "sell 98 5 FAK");
        assert!(output.contains("Creating Sell order ID: 2"));
        assert!(output.contains("Error: fill-and-kill order 2 would not match, discarding"));
        assert!(shell.book().is_empty());

        run(&mut shell, "buy 50 4");
        let (flow, output) = run(&mut shell, "modify 3 50 0");
        assert_eq!(flow, Flow::Continue);
        assert!(output.contains("Error: quantity must be positive"));
        assert_eq!(
            shell.book().find_order(3).map(|order| order.remaining_quantity()),
            Some(4)
        );

        let (_, output) = run(&mut shell, "modify 3 50.001 4");
        assert!(output.contains("Error: price 50.001 is not a multiple of tick size 0.01"));
        assert_eq!(shell.book().best_bid(), Some(dec!(50)));
    }

    #[test]
    fn test_volume_overflow_is_reported() {
        let mut shell = Shell::new(OrderBook::default());

        run(&mut shell, "buy 10 18446744073709551615");
        let (flow, output) = run(&mut shell, "buy 10 18446744073709551615");

        assert_eq!(flow, Flow::Continue);
        assert!(output.contains("Error: order 2 for 18446744073709551615 would overflow"));
        assert_eq!(shell.book().len(), 1);
        assert_eq!(shell.book().volume(Side::Buy), u64::MAX);
    }
}
