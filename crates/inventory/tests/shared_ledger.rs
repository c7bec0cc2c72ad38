use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Utc;

use rackledger_core::Actor;
use rackledger_inventory::{Grid, Ledger, LedgerCommand, Location, MoveStock, SharedLedger};
use rackledger_products::{Catalog, Product, ProductCode};

const FROM: Location = Location::new('A', 1, 1);
const TO: Location = Location::new('B', 3, 2);
const STOCK: i64 = 200;

fn code() -> ProductCode {
    ProductCode::new("PRD001").unwrap()
}

fn shared_with_stock() -> SharedLedger {
    let mut catalog = Catalog::new();
    catalog
        .register(Product::new(code(), "Premium Coffee Beans", 24, 800).unwrap())
        .unwrap();

    let mut ledger = Ledger::new(Grid::default(), Arc::new(catalog));
    ledger.inbound(&code(), FROM, STOCK, &Actor::from("seed")).unwrap();
    SharedLedger::new(ledger)
}

fn move_command(from: Location, to: Location, actor: &str) -> LedgerCommand {
    LedgerCommand::Move(MoveStock {
        product: code(),
        from,
        to,
        cases: 1,
        actor: Actor::from(actor),
        occurred_at: Utc::now(),
    })
}

fn cases_at(ledger: &Ledger, location: Location) -> u64 {
    ledger
        .query_location(&location)
        .unwrap()
        .iter()
        .map(|e| e.cases)
        .sum()
}

#[test]
fn readers_never_observe_a_partial_move() {
    let shared = shared_with_stock();
    let done = Arc::new(AtomicBool::new(false));

    let movers: Vec<_> = [(FROM, TO, "mover-a"), (TO, FROM, "mover-b")]
        .into_iter()
        .map(|(from, to, actor)| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    // Either side may run dry for a moment; that is a clean rejection.
                    let _ = shared.execute(&move_command(from, to, actor));
                }
            })
        })
        .collect();

    let reader = {
        let shared = shared.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observations = 0u64;
            while !done.load(Ordering::Acquire) {
                let total = shared
                    .read_with(|ledger| cases_at(ledger, FROM) + cases_at(ledger, TO))
                    .unwrap();
                assert_eq!(total, STOCK as u64);
                observations += 1;
            }
            observations
        })
    };

    for mover in movers {
        mover.join().unwrap();
    }
    done.store(true, Ordering::Release);
    reader.join().unwrap();

    let stock = shared.query_product(&code()).unwrap();
    assert_eq!(stock.total_cases, STOCK as u64);
    assert!(stock.locations.iter().all(|(_, cases)| *cases > 0));
}

#[test]
fn feed_preserves_commit_order_across_threads() {
    let shared = shared_with_stock();
    let feed = shared.subscribe();

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    shared
                        .execute(&move_command(FROM, Location::new('C', n + 1, 1), "worker"))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let sequences: Vec<u64> = feed.drain().iter().map(|e| e.sequence_number()).collect();
    assert_eq!(sequences.len(), 100);
    assert!(sequences.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(shared.journal().unwrap().len(), 101);
    assert_eq!(shared.query_location(&FROM).unwrap()[0].cases, 100);
}

#[test]
fn subscriber_thread_receives_moves_as_they_commit() {
    let shared = shared_with_stock();
    let feed = shared.subscribe();

    let consumer = thread::spawn(move || {
        (0..3)
            .map(|_| feed.recv().unwrap().into_payload().to)
            .collect::<Vec<_>>()
    });

    for position in 1..=3 {
        shared
            .execute(&move_command(FROM, Location::new('D', position, 1), "picker"))
            .unwrap();
    }

    let destinations = consumer.join().unwrap();
    assert_eq!(
        destinations,
        vec![
            Some(Location::new('D', 1, 1)),
            Some(Location::new('D', 2, 1)),
            Some(Location::new('D', 3, 1)),
        ]
    );
}
