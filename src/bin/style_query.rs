use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use style_scout::ModelBundle;

const USAGE: &str = "usage: style_query [--model-dir DIR] [--data FILE] COMMAND
commands:
  predict ATTR=VALUE [ATTR=VALUE ...]   predict a style from raw attributes
  similar NAME [--top N]                find players with a similar style
  profile NAME                          show a player's profile and style
  styles                                list all style labels";

fn main() -> Result<()> {
    let model_dir = parse_path_arg("--model-dir")
        .or_else(|| std::env::var("STYLE_MODEL_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("models"));
    let data_path = parse_path_arg("--data")
        .or_else(|| std::env::var("STYLE_DATA_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("FC26.csv"));

    let command = positional_args()
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("{USAGE}"))?;

    let bundle = ModelBundle::load(&model_dir, &data_path)
        .with_context(|| format!("load model from {}", model_dir.display()))?;

    match command.as_str() {
        "predict" => predict(&bundle),
        "similar" => similar(&bundle),
        "profile" => profile(&bundle),
        "styles" => {
            for (idx, label) in bundle.styles().entries() {
                println!("{idx}: {label}");
            }
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'\n{USAGE}")),
    }
}

fn predict(bundle: &ModelBundle) -> Result<()> {
    let mut attributes = HashMap::new();
    for arg in positional_args().into_iter().skip(1) {
        let Some((name, raw)) = arg.split_once('=') else {
            return Err(anyhow!("expected ATTR=VALUE, got '{arg}'"));
        };
        let value = raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("parse value for attribute '{name}'"))?;
        attributes.insert(name.trim().to_string(), value);
    }
    if attributes.is_empty() {
        return Err(anyhow!("predict needs at least one ATTR=VALUE pair"));
    }

    let prediction = bundle.predict_style(&attributes)?;
    println!("cluster {}: {}", prediction.cluster_id, prediction.style);
    Ok(())
}

fn similar(bundle: &ModelBundle) -> Result<()> {
    let name = positional_args()
        .into_iter()
        .nth(1)
        .ok_or_else(|| anyhow!("similar needs a player name"))?;
    let top_n = parse_raw_arg("--top")
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(5);

    let hits = bundle.similar_players(&name, top_n)?;
    for (rank, hit) in hits.iter().enumerate() {
        println!("{}. {} (distance {:.3})", rank + 1, hit.name, hit.distance);
    }
    Ok(())
}

fn profile(bundle: &ModelBundle) -> Result<()> {
    let name = positional_args()
        .into_iter()
        .nth(1)
        .ok_or_else(|| anyhow!("profile needs a player name"))?;

    let p = bundle.player_profile(&name)?;
    println!("name: {}", p.name);
    if let Some(age) = p.age {
        println!("age: {age:.0}");
    }
    if let Some(overall) = p.overall {
        println!("overall: {overall:.0}");
    }
    if let Some(positions) = &p.positions {
        println!("positions: {positions}");
    }
    println!("style: {} (cluster {})", p.style, p.cluster_id);
    Ok(())
}

/// Arguments that are neither `--flag value` pairs nor `--flag=value`.
fn positional_args() -> Vec<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !arg.contains('=');
            continue;
        }
        out.push(arg.clone());
    }
    out
}

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    parse_raw_arg(name).map(PathBuf::from)
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
