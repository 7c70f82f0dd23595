use bson::{Bson, bson};
use fake::{Fake, faker::name::en::Name};
use rand::Rng;

const TAGS: [&str; 6] = ["credit", "debit", "active", "expired", "premium", "blocked"];
const KINDS: [&str; 3] = ["purchase", "refund", "withdrawal"];

/// `total` people shaped like the query fixtures: cards with tags and transactions.
pub fn generate_people(total: usize) -> Vec<Bson> {
    let mut rng = rand::rng();
    let mut out = Vec::with_capacity(total);
    for i in 0..total {
        let name: String = Name().fake();
        let cards: Vec<Bson> = (0..rng.random_range(0..4))
            .map(|_| {
                let tags: Vec<&str> = TAGS.iter().copied().filter(|_| rng.random_bool(0.4)).collect();
                let txs: Vec<Bson> = (0..rng.random_range(0..6))
                    .map(|_| {
                        bson!({
                            "amount": rng.random_range(1..500),
                            "type": KINDS[rng.random_range(0..KINDS.len())],
                            "date": format!("2023-{:02}-{:02}", rng.random_range(1..=12), rng.random_range(1..=28)),
                        })
                    })
                    .collect();
                bson!({"card_number": format!("{:04}", rng.random_range(0..10_000)), "tags": tags, "transactions": txs})
            })
            .collect();
        out.push(bson!({
            "id": i64::try_from(i).unwrap_or(i64::MAX),
            "name": name,
            "age": rng.random_range(18..80),
            "items": cards,
            "scores": [[rng.random_range(0..100), rng.random_range(0..100)], [rng.random_range(0..100)]],
        }));
    }
    out
}
