use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const COLUMNS: [&str; 13] = [
    "id",
    "name",
    "price",
    "neighbourhood_cleansed",
    "room_type",
    "reviews_per_month",
    "host_acceptance_rate",
    "review_scores_rating",
    "review_scores_accuracy",
    "review_scores_cleanliness",
    "review_scores_checkin",
    "review_scores_communication",
    "review_scores_value",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// A score in `[1, 5]` formatted like the public exports, or empty.
fn score(rng: &mut SimpleRng, mean: f64) -> String {
    if rng.chance(0.08) {
        return String::new();
    }
    format!("{:.2}", rng.gauss(mean, 0.25).clamp(1.0, 5.0))
}

fn currency(value: f64) -> String {
    let cents = (value * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}.{:02}", cents % 100)
}

fn generate_row(rng: &mut SimpleRng, id: u64) -> Vec<String> {
    let neighbourhoods = ["Mitte", "Kreuzberg", "Neukölln", "Pankow", "Friedrichshain", "Wedding"];
    let room_types = ["Entire home/apt", "Private room", "Shared room", "Hotel room"];
    let adjectives = ["Cosy", "Bright", "Quiet", "Spacious", "Charming", "Modern"];
    let kinds = ["flat", "studio", "loft", "room", "apartment"];

    let neighbourhood = rng.pick(&neighbourhoods);
    let room_type = rng.pick(&room_types);
    let base = match room_type {
        "Entire home/apt" => 4.7,
        "Hotel room" => 4.9,
        "Private room" => 4.0,
        _ => 3.4,
    };

    let price = if rng.chance(0.02) {
        rng.pick(&["", "abc", "TBD"]).to_string()
    } else {
        currency(rng.gauss(base, 0.6).exp())
    };
    let reviews_per_month = if rng.chance(0.1) {
        String::new()
    } else {
        format!("{:.2}", rng.gauss(1.5, 1.0).abs())
    };
    let acceptance = if rng.chance(0.1) {
        rng.pick(&["", "N/A"]).to_string()
    } else {
        format!("{:.0}%", (100.0 - rng.gauss(0.0, 15.0).abs()).max(0.0))
    };
    let quality = rng.gauss(4.7, 0.1);

    let mut row = vec![
        (1_000_000 + id).to_string(),
        format!("{} {} in {neighbourhood}", rng.pick(&adjectives), rng.pick(&kinds)),
        price,
        neighbourhood.to_string(),
        room_type.to_string(),
        reviews_per_month,
        acceptance,
    ];
    row.extend((0..6).map(|_| score(rng, quality)));
    row
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let n_rows: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2_000);

    let rows: Vec<Vec<String>> = (0..n_rows).map(|id| generate_row(&mut rng, id)).collect();

    // Write CSV
    let csv_path = "sample_listings.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer.write_record(COLUMNS).expect("Failed to write header");
    for row in &rows {
        writer.write_record(row).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");

    // Build Arrow arrays, one nullable string column per field
    let schema = Arc::new(Schema::new(
        COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = (0..COLUMNS.len())
        .map(|c| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| Some(row[c].as_str()).filter(|v| !v.is_empty()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_listings.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote {n_rows} listings to {csv_path} and {parquet_path}");
}
