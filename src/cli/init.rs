//! Init command - write a config template

use crate::config::CONFIG_FILE_NAMES;
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# oxmd configuration
#
# Thresholds seed the extreme value of each metric. A metric whose worst
# value stays within its threshold contributes a factor of 1.

[metrics.coverage]
# Minimum method coverage in percent (lower coverage is worse)
threshold = 70

[metrics.crap-index]
threshold = 30

[metrics.npath-complexity]
threshold = 200

[metrics.cyclomatic-complexity]
threshold = 4

[pricing]
# price = base_price + combined factor * unit_cost
base_price = 119.0
unit_cost = 200.0

[defaults]
# Output format (text, json)
format = "text"

# List every violation above the certification sheet
list_violations = false
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let dir = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !dir.is_dir() {
        anyhow::bail!("Path is not a directory: {}", dir.display());
    }

    if let Some(existing) = CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
    {
        anyhow::bail!("Config already exists at {}", existing.display());
    }

    let config_path = dir.join(CONFIG_FILE_NAMES[0]);
    std::fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!(
        "  {} Price a module",
        style("oxmd certify violations.json").cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certification::CertificationCost;
    use crate::config::load_project_config;
    use crate::models::MetricKind;

    #[test]
    fn test_template_matches_defaults() {
        let config: crate::config::ProjectConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let thresholds = config.thresholds().unwrap();
        for kind in MetricKind::ALL {
            assert_eq!(thresholds[&kind], kind.default_threshold(), "{kind}");
        }
        assert_eq!(config.cost().unwrap(), CertificationCost::default());
    }

    #[test]
    fn test_init_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path()).unwrap();
        assert!(dir.path().join("oxmd.toml").exists());
        assert!(load_project_config(dir.path()).is_ok());

        let err = run(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_init_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(&dir.path().join("missing")).is_err());
    }
}
