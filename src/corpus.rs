//! Adversarial payload corpus and random payload generation
//!
//! The fixed corpus covers injection, edge-value, encoding and structural
//! attack classes. It is deterministic: every call yields the same sequence,
//! including the realistic-looking entries, which are drawn from a
//! constant-seeded generator so regression runs stay reproducible. Random
//! payloads are independent per call and use the thread RNG.

use chrono::Utc;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName, ZipCode};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Paragraph;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use crate::results::Payload;

/// Seed for the realistic entries of the fixed corpus.
const CORPUS_SEED: u64 = 0x5eed_f0dd_e201;

/// Build a JSON object literal as a [`Payload`].
macro_rules! payload {
    ($($body:tt)*) => {
        match serde_json::json!({ $($body)* }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    };
}

/// The fixed adversarial corpus, in dispatch order.
///
/// Same sequence on every call.
pub fn build_corpus() -> Vec<Payload> {
    let mut rng = StdRng::seed_from_u64(CORPUS_SEED);

    vec![
        // Empty and degenerate shapes
        Payload::new(),
        payload! { "": "" },
        // SQL injection
        payload! { "username": "admin' OR '1'='1", "password": "password" },
        payload! { "id": "1 OR 1=1" },
        payload! { "query": "'; DROP TABLE users--" },
        // Cross-site scripting
        payload! { "name": "<script>alert('XSS')</script>" },
        payload! { "comment": "<img src=x onerror=alert('XSS')>" },
        // Command injection and path traversal
        payload! { "file": "; ls -la" },
        payload! { "path": "../../etc/passwd" },
        // Type confusion
        payload! { "id": "not_a_number" },
        payload! { "active": "true_string_not_bool" },
        payload! { "count": [1, 2, 3] },
        // Extreme numeric values
        payload! { "age": -1 },
        payload! { "price": 999_999_999_999_999i64 },
        payload! { "quantity": 0 },
        // Very long strings
        payload! { "description": "A".repeat(10_000) },
        payload! { "name": random_string_with(&mut rng, 1_000) },
        // Special characters and non-ASCII
        payload! { "text": "!@#$%^&*(){}[]|\\:;\"'<>,.?/~`" },
        payload! { "unicode": "☠️💀👻🔥" },
        // Null handling
        payload! { "value": null },
        payload! { "data": "null" },
        // Malformed formats
        payload! { "email": "not-an-email" },
        payload! { "url": "invalid://url" },
        payload! { "date": "not-a-date" },
        // Realistic but semantically unexpected values
        payload! { "name": fake_name(&mut rng) },
        payload! { "email": fake_email(&mut rng) },
        payload! { "address": fake_address(&mut rng) },
        payload! { "phone": fake_phone(&mut rng) },
        payload! { "text": fake_paragraph(&mut rng) },
        // Nested and heterogeneous structures
        payload! { "nested": { "deep": { "very": { "deep": "value" } } } },
        payload! { "array": [] },
        payload! { "mixed": [1, "two", { "three": 3 }, null] },
    ]
}

/// One randomly shaped, realistically filled payload.
///
/// Shapes are chosen uniformly; calls are independent, no history is kept.
pub fn build_random_payload() -> Payload {
    let mut rng = rand::thread_rng();

    match rng.gen_range(0..5) {
        0 => payload! {
            "name": fake_name(&mut rng),
            "email": fake_email(&mut rng),
        },
        1 => payload! {
            "id": rng.gen_range(1..=1000),
            "active": rng.gen_bool(0.5),
        },
        2 => payload! {
            "text": fake_paragraph(&mut rng),
            "timestamp": Utc::now().to_rfc3339(),
        },
        3 => {
            let len = rng.gen_range(5..=50);
            payload! { "data": random_string_with(&mut rng, len) }
        }
        _ => {
            let key = random_string_with(&mut rng, 5);
            let value = random_string_with(&mut rng, 10);
            let mut map = Payload::new();
            map.insert(key, Value::String(value));
            map
        }
    }
}

/// Random alphanumeric string of the given length.
pub fn random_string(len: usize) -> String {
    random_string_with(&mut rand::thread_rng(), len)
}

fn random_string_with<R: Rng>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn fake_name<R: Rng>(rng: &mut R) -> String {
    Name().fake_with_rng::<String, _>(rng)
}

fn fake_email<R: Rng>(rng: &mut R) -> String {
    SafeEmail().fake_with_rng::<String, _>(rng)
}

fn fake_address<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {}, {} {}",
        BuildingNumber().fake_with_rng::<String, _>(rng),
        StreetName().fake_with_rng::<String, _>(rng),
        CityName().fake_with_rng::<String, _>(rng),
        ZipCode().fake_with_rng::<String, _>(rng),
    )
}

fn fake_phone<R: Rng>(rng: &mut R) -> String {
    PhoneNumber().fake_with_rng::<String, _>(rng)
}

fn fake_paragraph<R: Rng>(rng: &mut R) -> String {
    Paragraph(1..3).fake_with_rng::<String, _>(rng)
}
