use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use style_scout::train::{TrainConfig, train};

fn main() -> Result<()> {
    let data_path = parse_path_arg("--data")
        .or_else(|| std::env::var("STYLE_DATA_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("FC26.csv"));
    let out_dir = parse_path_arg("--out-dir")
        .or_else(|| std::env::var("STYLE_MODEL_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("models"));

    if !data_path.exists() {
        return Err(anyhow!(
            "dataset {} not found; pass --data or set STYLE_DATA_PATH",
            data_path.display()
        ));
    }

    let mut cfg = TrainConfig::new(data_path, out_dir);
    if let Some(k) = parse_usize_arg("--clusters") {
        cfg.n_clusters = k;
    }
    if let Some(n) = parse_usize_arg("--n-init") {
        cfg.n_init = n;
    }
    if let Some(seed) = parse_u64_arg("--seed") {
        cfg.seed = seed;
    }

    let outcome = train(&cfg).context("training run failed")?;

    println!(
        "trained {} clusters on {} players (inertia {:.2})",
        outcome.stats.len(),
        outcome.rows,
        outcome.inertia
    );
    for stat in &outcome.stats {
        println!();
        println!("cluster {}: {}", stat.cluster_id, stat.label);
        println!("  players: {}", stat.count);
        if let Some(avg) = stat.avg_overall {
            println!("  avg rating: {avg:.1}");
        }
        let profile = stat
            .style_profile
            .iter()
            .map(|(name, v)| format!("{name}={v:.1}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("  profile: {profile}");
        if !stat.sample_players.is_empty() {
            println!("  sample: {}", stat.sample_players.join(", "));
        }
    }
    println!();
    println!("artifacts written to {}", outcome.out_dir.display());
    Ok(())
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_raw_arg(name).map(PathBuf::from)
}

fn parse_usize_arg(name: &str) -> Option<usize> {
    parse_raw_arg(name).and_then(|raw| raw.parse().ok())
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    parse_raw_arg(name).and_then(|raw| raw.parse().ok())
}

fn parse_raw_arg(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}="))
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
