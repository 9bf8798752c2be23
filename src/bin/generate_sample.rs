use std::sync::Arc;

use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

struct Row {
    date: String,
    region: String,
    artist: String,
    streams: i64,
    chart: String,
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (region, market size multiplier)
    let regions = [
        ("Belgium", 1),
        ("France", 4),
        ("Germany", 5),
        ("Spain", 3),
        ("Mexico", 6),
        ("Chile", 2),
        ("Japan", 3),
    ];
    let artists = [
        "Stromae", "Angèle", "Bad Bunny", "Rosalía", "PNL", "Aya Nakamura", "Capital Bra",
        "Mon Laferte", "Kenshi Yonezu", "Ed Sheeran", "Billie Eilish", "Drake", "Dua Lipa",
        "Ozuna", "J Balvin", "Daft Punk",
    ];
    let days = 30;

    let mut rows = Vec::new();
    for day in 1..=days {
        let date = format!("2021-06-{day:02}");
        for &(region, size) in &regions {
            for _ in 0..20 {
                let artist = artists[rng.below(artists.len())];
                let streams = (1_000 + rng.below(40_000)) as i64 * size;
                rows.push(Row {
                    date: date.clone(),
                    region: region.to_string(),
                    artist: artist.to_string(),
                    streams,
                    chart: "top200".to_string(),
                });
            }
            // A few rows from another tier; the dashboard must ignore them.
            for _ in 0..5 {
                rows.push(Row {
                    date: date.clone(),
                    region: region.to_string(),
                    artist: artists[rng.below(artists.len())].to_string(),
                    streams: 0,
                    chart: "viral50".to_string(),
                });
            }
        }
    }

    // Write CSV
    let csv_path = "sample_charts.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["date", "region", "artist", "streams", "chart"])
        .expect("Failed to write CSV header");
    for row in &rows {
        let streams = if row.chart == "top200" {
            row.streams.to_string()
        } else {
            String::new()
        };
        writer
            .write_record([&row.date, &row.region, &row.artist, &streams, &row.chart])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let column = |f: fn(&Row) -> &str| {
        StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
    };
    let date_array = column(|r| r.date.as_str());
    let region_array = column(|r| r.region.as_str());
    let artist_array = column(|r| r.artist.as_str());
    let chart_array = column(|r| r.chart.as_str());
    let streams_array = Int64Array::from(rows.iter().map(|r| r.streams).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("artist", DataType::Utf8, false),
        Field::new("streams", DataType::Int64, false),
        Field::new("chart", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(date_array),
            Arc::new(region_array),
            Arc::new(artist_array),
            Arc::new(streams_array),
            Arc::new(chart_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_charts.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} chart rows across {} regions to {output_path} and {csv_path}",
        rows.len(),
        regions.len()
    );
}
