use matchbook::{Order, OrderBook, OrderModify, OrderType, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn book() -> OrderBook {
    OrderBook::new(dec!(0.01)).expect("tick size must be positive")
}

fn order(order_type: OrderType, id: u64, side: Side, price: Decimal, qty: u64) -> Order {
    Order::new(order_type, id, side, price, qty).expect("invalid order")
}

#[test]
fn buy_and_sell_at_same_price_trade_out() {
    let mut book = book();

    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Buy, dec!(20.0), 10))
        .expect("no fault");
    let trades = book
        .add_order(order(OrderType::GoodTillCancel, 2, Side::Sell, dec!(20.0), 10))
        .expect("no fault");

    assert_eq!(trades.len(), 1);
    assert_eq!(
        (trades[0].bid().order_id, trades[0].bid().price, trades[0].bid().quantity),
        (1, dec!(20.0), 10)
    );
    assert_eq!(
        (trades[0].ask().order_id, trades[0].ask().price, trades[0].ask().quantity),
        (2, dec!(20.0), 10)
    );
    assert_eq!(book.len(), 0);
}

#[test]
fn sell_matches_best_bid_first() {
    let mut book = book();
    for (id, price, qty) in [
        (101, dec!(100.00), 10),
        (102, dec!(101.00), 5),
        (103, dec!(99.00), 7),
    ] {
        book.add_order(order(OrderType::GoodTillCancel, id, Side::Buy, price, qty))
            .expect("no fault");
    }

    let trades = book
        .add_order(order(OrderType::GoodTillCancel, 201, Side::Sell, dec!(100.00), 3))
        .expect("no fault");

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].bid().order_id, 102);
    assert_eq!(trades[0].quantity(), 3);
    assert_eq!(
        book.find_order(102).map(|o| o.remaining_quantity()),
        Some(2)
    );
    assert_eq!(book.len(), 3);
}

#[test]
fn unmatched_fill_and_kill_leaves_no_trace() {
    let mut book = book();
    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Buy, dec!(97.00), 4))
        .expect("no fault");
    let bids_before = book.depth(Side::Buy);
    let asks_before = book.depth(Side::Sell);

    let trades = book
        .add_order(order(OrderType::FillAndKill, 301, Side::Buy, dec!(98.00), 5))
        .expect("no fault");

    assert!(trades.is_empty());
    assert_eq!(book.len(), 1);
    assert!(book.find_order(301).is_none());
    assert_eq!(book.depth(Side::Buy), bids_before);
    assert_eq!(book.depth(Side::Sell), asks_before);
}

#[test]
fn cancel_unknown_id_is_noop() {
    let mut book = book();
    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Sell, dec!(10.00), 4))
        .expect("no fault");

    book.cancel_order(999);

    assert_eq!(book.len(), 1);
    assert_eq!(book.best_ask(), Some(dec!(10.00)));
}

#[test]
fn modify_moves_order_to_new_price_at_tail() {
    let mut book = book();
    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Buy, dec!(20.0), 10))
        .expect("no fault");
    book.add_order(order(OrderType::GoodTillCancel, 2, Side::Buy, dec!(21.0), 3))
        .expect("no fault");

    let trades = book
        .modify_order(OrderModify::new(1, dec!(21.0), 12))
        .expect("no fault");

    assert!(trades.is_empty());
    assert!(book.orders_at(Side::Buy, dec!(20.0)).is_empty());
    let queue: Vec<_> = book
        .orders_at(Side::Buy, dec!(21.0))
        .iter()
        .map(|o| (o.id(), o.remaining_quantity()))
        .collect();
    assert_eq!(queue, vec![(2, 3), (1, 12)]);
}

#[test]
fn modified_order_fills_after_later_arrival() {
    let mut book = book();
    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Sell, dec!(30.00), 5))
        .expect("no fault");
    book.add_order(order(OrderType::GoodTillCancel, 2, Side::Sell, dec!(30.00), 5))
        .expect("no fault");

    book.modify_order(OrderModify::new(1, dec!(30.00), 5))
        .expect("no fault");
    let trades = book
        .add_order(order(OrderType::GoodTillCancel, 3, Side::Buy, dec!(30.00), 7))
        .expect("no fault");

    let fills: Vec<_> = trades
        .iter()
        .map(|t| (t.ask().order_id, t.quantity()))
        .collect();
    assert_eq!(fills, vec![(2, 5), (1, 2)]);
}

#[test]
fn trades_stop_once_book_uncrosses() {
    let mut book = book();
    book.add_order(order(OrderType::GoodTillCancel, 1, Side::Sell, dec!(10.00), 5))
        .expect("no fault");
    book.add_order(order(OrderType::GoodTillCancel, 2, Side::Sell, dec!(10.50), 5))
        .expect("no fault");
    book.add_order(order(OrderType::GoodTillCancel, 3, Side::Sell, dec!(11.00), 5))
        .expect("no fault");

    let trades = book
        .add_order(order(OrderType::GoodTillCancel, 4, Side::Buy, dec!(10.50), 20))
        .expect("no fault");

    assert_eq!(trades.len(), 2);
    assert_eq!(book.best_bid(), Some(dec!(10.50)));
    assert_eq!(book.best_bid_volume(), Some(10));
    assert_eq!(book.best_ask(), Some(dec!(11.00)));
    assert_eq!(book.spread(), Some(dec!(0.50)));
}
