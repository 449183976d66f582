//! Fake value generators backing the `(random:<type>)` directives.
//!
//! Every function draws from the caller's RNG so tests can seed it.

use chrono::{Duration, SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Amara", "Bruno", "Chen", "Clara", "Diego", "Elena", "Farah", "Grace",
    "Hiro", "Ines", "Jonas", "Kavya", "Liam", "Maya", "Noah", "Olga", "Priya", "Quinn",
    "Rafael", "Sofia", "Tariq", "Uma", "Viktor", "Wen", "Yara", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Baker", "Castillo", "Dubois", "Eriksen", "Fischer", "Garcia", "Hughes",
    "Ivanova", "Johnson", "Kowalski", "Lopez", "Moreau", "Nakamura", "Okafor", "Patel",
    "Rossi", "Schmidt", "Tanaka", "Novak", "Walker", "Young",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "Labs", "Systems", "& Co", "Partners"];

const DOMAINS: &[&str] = &["example.com", "example.org", "mail.test", "inbox.dev"];

const TLDS: &[&str] = &["com", "org", "net", "io", "dev"];

const STREETS: &[&str] = &[
    "Maple", "Oak", "Cedar", "Elm", "Harbor", "Hillside", "Lake", "Meadow", "River", "Sunset",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Boulevard", "Way"];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Fairview", "Lakewood", "Georgetown", "Ashland", "Brookfield",
    "Milton",
];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
    "enim", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
];

/// Pick one entry from a non-empty list.
fn pick<R: Rng>(rng: &mut R, items: &[&'static str]) -> &'static str {
    items[rng.gen_range(0..items.len())]
}

/// Version 4 UUID built from the caller's RNG.
pub fn uuid<R: Rng>(rng: &mut R) -> String {
    ::uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

/// 24 hex digit document identifier.
pub fn object_id<R: Rng>(rng: &mut R) -> String {
    let bytes: [u8; 12] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn alphanumeric<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

pub fn full_name<R: Rng>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

pub fn email<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}.{}{}@{}",
        pick(rng, FIRST_NAMES).to_lowercase(),
        pick(rng, LAST_NAMES).to_lowercase(),
        rng.gen_range(1..100),
        pick(rng, DOMAINS)
    )
}

pub fn integer<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(1..=1000)
}

/// Float in [0, 1000) with two decimals.
pub fn float<R: Rng>(rng: &mut R) -> f64 {
    (rng.gen_range(0.0..1000.0_f64) * 100.0).round() / 100.0
}

/// A point in time within the last year.
fn recent<R: Rng>(rng: &mut R) -> chrono::DateTime<Utc> {
    Utc::now() - Duration::seconds(rng.gen_range(0..365 * 24 * 3600))
}

/// Recent calendar date, `YYYY-MM-DD`.
pub fn date<R: Rng>(rng: &mut R) -> String {
    recent(rng).format("%Y-%m-%d").to_string()
}

/// Recent RFC 3339 timestamp with millisecond precision.
pub fn datetime<R: Rng>(rng: &mut R) -> String {
    recent(rng).to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn url<R: Rng>(rng: &mut R) -> String {
    format!("https://www.{}.{}", pick(rng, WORDS), pick(rng, TLDS))
}

pub fn image<R: Rng>(rng: &mut R) -> String {
    format!("https://picsum.photos/seed/{}/640/480", rng.gen_range(1..100_000))
}

pub fn company<R: Rng>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, LAST_NAMES), pick(rng, COMPANY_SUFFIXES))
}

pub fn address<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {} {}, {}",
        rng.gen_range(1..10_000),
        pick(rng, STREETS),
        pick(rng, STREET_SUFFIXES),
        pick(rng, CITIES)
    )
}

pub fn phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "+1-{:03}-{:03}-{:04}",
        rng.gen_range(200..1000),
        rng.gen_range(200..1000),
        rng.gen_range(0..10_000)
    )
}

/// One capitalized sentence of 6 to 12 words.
pub fn sentence<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(6..=12);
    let words: Vec<&str> = (0..len).map(|_| pick(rng, WORDS)).collect();
    let mut text = words.join(" ");
    if let Some(first) = text.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    text.push('.');
    text
}

pub fn sentences<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn paragraph<R: Rng>(rng: &mut R) -> String {
    let count = rng.gen_range(3..=5);
    sentences(rng, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_uuid_is_v4() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = uuid(&mut rng);
        let parsed = ::uuid::Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_object_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = object_id(&mut rng);
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_email_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let email = email(&mut rng);
            let (local, domain) = email.split_once('@').unwrap();
            assert!(!local.is_empty());
            assert!(DOMAINS.contains(&domain));
        }
    }

    #[test]
    fn test_numeric_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert!((1..=1000).contains(&integer(&mut rng)));
            let f = float(&mut rng);
            assert!((0.0..=1000.0).contains(&f));
        }
    }

    #[test]
    fn test_dates_parse() {
        let mut rng = StdRng::seed_from_u64(5);
        let d = date(&mut rng);
        assert!(chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d").is_ok());
        let ts = datetime(&mut rng);
        let parsed = chrono::DateTime::parse_from_rfc3339(&ts).unwrap();
        assert!(parsed.with_timezone(&Utc) <= Utc::now());
    }

    #[test]
    fn test_sentence_is_capitalized() {
        let mut rng = StdRng::seed_from_u64(9);
        let s = sentence(&mut rng);
        assert!(s.chars().next().unwrap().is_ascii_uppercase());
        assert!(s.ends_with('.'));
        assert_eq!(sentences(&mut rng, 2).matches('.').count(), 2);
    }
}
