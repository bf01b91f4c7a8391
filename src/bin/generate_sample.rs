use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Continent name and a rough (lat, lon) box events are scattered over.
const REGIONS: [(&str, (f64, f64), (f64, f64)); 6] = [
    ("Asia", (-10.0, 50.0), (70.0, 150.0)),
    ("South America", (-45.0, 10.0), (-80.0, -65.0)),
    ("North America", (15.0, 60.0), (-150.0, -100.0)),
    ("Europe", (35.0, 45.0), (10.0, 30.0)),
    ("Oceania", (-45.0, -5.0), (150.0, 180.0)),
    ("Africa", (-15.0, 15.0), (25.0, 40.0)),
];

/// Relative activity of each region, same order as `REGIONS`.
const WEIGHTS: [f64; 6] = [0.35, 0.2, 0.15, 0.1, 0.15, 0.05];

#[derive(Serialize)]
struct Row {
    magnitude: f64,
    latitude: f64,
    longitude: f64,
    continent: &'static str,
    date: String,
    place: String,
    alert: &'static str,
}

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Magnitude above `m_min` following Gutenberg-Richter with slope `b`.
    fn gutenberg_richter(&mut self, m_min: f64, b: f64) -> f64 {
        let u = self.next_f64().max(1e-12);
        m_min - u.log10() / b
    }

    fn pick_region(&mut self) -> usize {
        let mut r = self.next_f64() * WEIGHTS.iter().sum::<f64>();
        for (i, w) in WEIGHTS.iter().enumerate() {
            if r < *w {
                return i;
            }
            r -= w;
        }
        WEIGHTS.len() - 1
    }
}

/// Stronger events are more likely to carry a higher alert.
fn alert_for(magnitude: f64, roll: f64) -> &'static str {
    match magnitude {
        m if m >= 7.0 && roll < 0.5 => "red",
        m if m >= 6.5 && roll < 0.6 => "orange",
        m if m >= 6.0 && roll < 0.7 => "yellow",
        m if m >= 5.5 && roll < 0.5 => "green",
        _ => "",
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2015, 1, 1)
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time");
    let span_seconds = 10.0 * 365.25 * 86_400.0;
    let n_events = 2_000;

    let output_path = "sample_earthquakes.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    for _ in 0..n_events {
        let (continent, (lat_lo, lat_hi), (lon_lo, lon_hi)) = REGIONS[rng.pick_region()];
        let magnitude = (rng.gutenberg_richter(4.0, 1.0).min(8.6) * 10.0).round() / 10.0;
        let date = start + Duration::seconds(rng.uniform(0.0, span_seconds) as i64);
        let distance = rng.uniform(5.0, 120.0).round();

        writer
            .serialize(Row {
                magnitude,
                latitude: rng.uniform(lat_lo, lat_hi),
                longitude: rng.uniform(lon_lo, lon_hi),
                continent,
                date: date.format("%Y-%m-%d %H:%M:%S").to_string(),
                place: format!("{distance} km from {continent} station"),
                alert: alert_for(magnitude, rng.next_f64()),
            })
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush output");

    println!("Wrote {n_events} events to {output_path}");
}
