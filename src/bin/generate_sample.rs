use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;

use bets_dashboard::data::model::REQUIRED_COLUMNS;
use bets_dashboard::settings::DEFAULT_DATASET;

/// Write a synthetic dataset in the raw published format.
#[derive(Debug, Parser)]
#[command(name = "generate_sample", about = "Write a synthetic betting dataset")]
struct Args {
    /// Output file [default: Top_100_Sports_Bets.csv].
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Number of matches to write.
    #[arg(short = 'n', long, default_value_t = 100)]
    rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// `1234567` → `1 234 567`, the way the published dataset writes numbers.
fn spaced(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET));
    let mut rng = SimpleRng::new(args.seed);

    let leagues: [(&str, &str, &[&str]); 5] = [
        ("Football", "Ligue 1", &["PSG", "Marseille", "Lyon", "Monaco", "Lille", "Lens"]),
        ("Football", "Ligue des Champions", &["PSG", "Real Madrid", "Bayern Munich", "Manchester City", "Barcelone"]),
        ("Football", "Coupe du Monde", &["France", "Argentine", "Brésil", "Angleterre", "Maroc"]),
        ("Tennis", "Roland Garros", &["Nadal", "Djokovic", "Alcaraz", "Medvedev", "Tsitsipas"]),
        ("Basketball", "NBA", &["Lakers", "Celtics", "Warriors", "Bucks", "Nuggets"]),
    ];
    let first_day = NaiveDate::from_ymd_opt(2019, 8, 1).context("invalid start date")?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer.write_record(REQUIRED_COLUMNS)?;

    for _ in 0..args.rows {
        let (sport, competition, teams) = rng.pick(&leagues);
        let home = rng.below(teams.len());
        let away = (home + 1 + rng.below(teams.len() - 1)) % teams.len();
        let date = first_day + Duration::days(rng.below(4 * 365) as i64);

        let n_joueurs = 20_000 + rng.below(180_000) as u64;
        let n_mises = n_joueurs + (n_joueurs as f64 * (0.5 + rng.next_f64() * 2.0)) as u64;
        let mises = (n_mises as f64 * (8.0 + rng.next_f64() * 30.0)) as u64;

        writer.write_record([
            sport.to_string(),
            competition.to_string(),
            date.format("%Y-%m-%d").to_string(),
            teams[home].to_string(),
            teams[away].to_string(),
            format!("{} €", spaced(mises)),
            spaced(n_mises),
            spaced(n_joueurs),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {} matches to {}", args.rows, output_path.display());
    Ok(())
}
