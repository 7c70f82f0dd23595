#![allow(dead_code)]

use arrayquery::utils::parse_json;
use bson::Bson;

const PEOPLE: &str = r#"[
  {
    "name": "John", "age": 30, "role": "developer",
    "tags": ["developer", "manager"],
    "items": [
      {
        "card_number": "1234", "tags": ["credit", "active"],
        "transactions": [
          {"amount": 100, "ext_id": "1", "ids": ["1", "2"], "type": "purchase", "date": "2023-01-01"},
          {"amount": 50, "ext_id": "2", "ids": ["3"], "type": "refund", "date": "2023-01-15"}
        ]
      },
      {
        "card_number": "0000", "tags": ["debit", "expired"],
        "transactions": [{"amount": 200, "type": "withdrawal", "date": "2023-02-01"}],
        "payments": [
          {"amount": 100, "type": "purchase", "date": "2023-01-01"},
          {"amount": 100, "type": "purchase", "date": "2023-01-01"}
        ]
      }
    ],
    "joined": "2023-01-15",
    "nested": {"level": 1, "value": "test", "metadata": {"created": "2023-01-01", "status": {"isActive": true}}},
    "scores": [[85, 90], [75, 80]]
  },
  {
    "name": "Jane", "age": 25, "role": "designer",
    "tags": ["designer"],
    "items": [
      {
        "card_number": "5678", "tags": ["credit", "active"],
        "transactions": [{"amount": 300, "type": "purchase", "date": "2023-03-01"}]
      },
      {"card_number": "9999", "tags": ["debit", "active"], "transactions": []}
    ],
    "joined": "2023-02-20",
    "nested": {"level": 2, "value": "demo", "metadata": {"created": "2023-02-01", "status": {"isActive": false}}},
    "scores": [[95, 92], [88, 85]]
  },
  {
    "name": "Bob", "age": 35, "role": "developer",
    "tags": ["developer", "architect"],
    "items": [],
    "joined": "2023-03-10",
    "nested": {"level": 1, "value": "prod", "metadata": {"created": "2023-03-01", "status": {"isActive": true}}},
    "scores": [[70, 75], [80, 85]]
  }
]"#;

/// Three people with cards, transactions and score matrices.
pub fn people() -> Vec<Bson> {
    match parse_json(PEOPLE).expect("fixture parses") {
        Bson::Array(items) => items,
        other => panic!("fixture is not a sequence: {other:?}"),
    }
}

/// Sorted `name` fields of the matched records.
pub fn names(hits: &[&Bson]) -> Vec<String> {
    let mut out: Vec<String> = hits
        .iter()
        .filter_map(|r| r.as_document().and_then(|d| d.get_str("name").ok()).map(str::to_string))
        .collect();
    out.sort();
    out
}
