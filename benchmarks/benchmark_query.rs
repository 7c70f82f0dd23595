mod synthetic_data;

use arrayquery::{QueryEngine, logger};
use bson::bson;
use std::time::Instant;

fn main() {
    let total: usize = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(50_000);
    if let Err(e) = logger::configure_from_env(|k| std::env::var(k).ok()) {
        eprintln!("warning: logging disabled: {e}");
    }
    let records = synthetic_data::generate_people(total);
    println!("Synthetic records ready: {}", records.len());

    let engine = QueryEngine::new();
    let queries = [
        ("scalar", bson!({"age": {"$gte": 40}})),
        ("broadcast", bson!({"items.transactions.amount": {"$gt": 450}})),
        ("aggregate", bson!({"items.tags": {"$containsAll": ["credit", "active"]}})),
        ("element", bson!({"items": {"$eleMatch": {
            "tags": {"$contains": "premium"},
            "transactions": {"$eleMatch": {"type": "refund", "date": {"$lt": "2023-03-01"}}}
        }}})),
        ("matrix", bson!({"scores": {"$eleMatch": {"$eleMatch": {"$gte": 99}}}})),
    ];
    for (label, q) in &queries {
        let pred = match engine.build(q) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{label}: {e}");
                continue;
            }
        };
        let start = Instant::now();
        match pred.filter(&records) {
            Ok(hits) => println!("{label:>10}: {:>7} matched in {:?}", hits.len(), start.elapsed()),
            Err(e) => eprintln!("{label}: {e}"),
        }
    }
}
