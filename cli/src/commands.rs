use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use arcstat_core::metrics::{format_clock, format_log_time};
use arcstat_core::{
    BuffCatalog, EncounterInput, EncounterReport, EngineConfigExt, aggregate, summarize,
};
use arcstat_types::EngineConfig;

/// Command line values that take precedence over the stored config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog: Option<PathBuf>,
    pub workers: Option<usize>,
    pub pretty: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(catalog) = &self.catalog {
            config.catalog_path = Some(catalog.display().to_string());
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.pretty {
            config.pretty_json = true;
        }
        config
    }
}

/// Error message including every source in the chain
pub fn describe(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn load_report(input: &Path, config: &EngineConfig) -> Result<EncounterReport, String> {
    let catalog = config.load_catalog().map_err(|e| describe(&e))?;
    let text = fs::read_to_string(input)
        .map_err(|e| format!("failed to read {}: {e}", input.display()))?;
    let dump = EncounterInput::from_json(&text)
        .map_err(|e| format!("invalid event dump {}: {e}", input.display()))?;

    tracing::debug!(
        path = %input.display(),
        agents = dump.agents.len(),
        events = dump.events.len(),
        "Event dump loaded"
    );

    aggregate(dump, &catalog, config).map_err(|e| describe(&e))
}

pub fn aggregate_file(
    input: &Path,
    out: Option<&Path>,
    config: &EngineConfig,
) -> Result<(), String> {
    let report = load_report(input, config)?;
    let json = if config.pretty_json {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| e.to_string())?;

    match out {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

pub fn show_summary(input: &Path, config: &EngineConfig) -> Result<(), String> {
    let report = load_report(input, config)?;
    let info = &report.encounter;

    let started = format_log_time(info.log_start).unwrap_or_else(|| info.log_start.to_string());
    println!(
        "{} ({}) - {} - {}",
        info.boss,
        if info.success { "kill" } else { "wipe" },
        format_clock(report.duration_ms()),
        started
    );
    println!();
    println!(
        "{:<24} {:<20} {:>3} {:>10} {:>10} {:>7} {:>7} {:>7} {:>8}",
        "Name", "Profession", "Grp", "Boss DPS", "DPS", "Crit%", "Schol%", "Quick%", "Canceled"
    );
    println!("{}", "-".repeat(104));

    let pct = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    for row in summarize(&report, config.quickness()) {
        let marker = if row.dead { " (dead)" } else { "" };
        println!(
            "{:<24} {:<20} {:>3} {:>10} {:>10} {:>7} {:>7} {:>7} {:>8}",
            format!("{}{marker}", row.name),
            row.profession.to_string(),
            row.subgroup,
            row.boss_dps.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
            row.dps.map_or_else(|| "-".to_string(), |v| format!("{v:.0}")),
            pct(row.crit_pct),
            pct(row.scholar_pct),
            pct(row.quickness_pct),
            format!("{}/{}", row.canceled_casts, row.casts),
        );
    }

    if !info.unknown_buffs.is_empty() {
        println!();
        println!("{} buff(s) missing from the catalog", info.unknown_buffs.len());
    }
    Ok(())
}

pub fn check_catalog(path: Option<&Path>) -> Result<(), String> {
    let catalog = match path {
        Some(path) => BuffCatalog::load(path),
        None => BuffCatalog::bundled(),
    }
    .map_err(|e| describe(&e))?;

    println!("{} buff definitions", catalog.len());
    if catalog.flagged().is_empty() {
        println!("no flagged entries");
        return Ok(());
    }

    println!("{:<10} Name", "Id");
    println!("{}", "-".repeat(40));
    for id in catalog.flagged() {
        if let Some(def) = catalog.get(*id) {
            println!("{:<10} {:?}", id, def.name);
        }
    }
    Ok(())
}

pub fn show_config(config: &EngineConfig) -> Result<(), String> {
    match EngineConfig::config_path() {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config location available"),
    }
    let text = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

pub fn save_config(config: &EngineConfig) -> Result<(), String> {
    config.save().map_err(|e| describe(&e))?;
    println!("configuration saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence() {
        let overrides = Overrides {
            catalog: Some(PathBuf::from("/tmp/buffs.toml")),
            workers: Some(3),
            pretty: true,
        };
        let config = overrides.apply(EngineConfig::default());
        assert_eq!(config.catalog_path.as_deref(), Some("/tmp/buffs.toml"));
        assert_eq!(config.workers, 3);
        assert!(config.pretty_json);
    }

    #[test]
    fn empty_overrides_keep_stored_values() {
        let stored = EngineConfig {
            workers: 8,
            pretty_json: true,
            ..Default::default()
        };
        assert_eq!(Overrides::default().apply(stored.clone()), stored);
    }

    #[test]
    fn describe_includes_sources() {
        let err = BuffCatalog::load(Path::new("/nonexistent/arcstat.toml")).unwrap_err();
        let message = describe(&err);
        assert!(message.starts_with("failed to read catalog /nonexistent/arcstat.toml: "));
    }
}
