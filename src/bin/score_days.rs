//! Print the diet score of each stored day
//! Usage: cargo run --bin score_days -- [limit]

use std::sync::Arc;

use fridgenutri::config::AppConfig;
use fridgenutri::db::Database;
use fridgenutri::scoring::{self, DEFAULT_HISTORY_DAYS};
use fridgenutri::store::{LedgerStore, SqliteKvStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let limit = match std::env::args().nth(1) {
        Some(raw) => raw.parse::<usize>()?,
        None => DEFAULT_HISTORY_DAYS,
    };

    let config = AppConfig::from_env()?;
    println!("Database: {}", config.database_path.display());

    let database = Database::open(&config.database_path)?;
    let store = LedgerStore::new(Arc::new(SqliteKvStore::new(database)));

    let Some(ledger) = store.try_load()? else {
        println!("No days stored yet");
        return Ok(());
    };
    let goals = store.load_profile()?.goals(&config.goal_defaults);

    for day in ledger.days().iter().rev().take(limit).rev() {
        let result = scoring::compute(day.totals(), &goals);
        let fmt = |s: Option<f64>| s.map(|v| format!("{:5.1}", v)).unwrap_or_else(|| "    -".into());
        println!(
            "{} {}  overall {:5.1} ({})  cal {} mac {} fib {} sug {} mic {}",
            day.id,
            day.weekday(),
            result.overall,
            result.band().as_str(),
            fmt(result.subscores.calories),
            fmt(result.subscores.macros),
            fmt(result.subscores.fiber),
            fmt(result.subscores.sugar),
            fmt(result.subscores.micros),
        );
    }

    Ok(())
}
