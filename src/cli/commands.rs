//! CLI command implementations
//!
//! Every command loads the optional config, then the fixture, opens its
//! query and reads the whole result set. Commands return their output;
//! `run_command` writes it.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::ColumnRef;
use crate::fixture::{Fixture, QueryResult};
use crate::markup::{self, MarkupOptions};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::result::{HierarchicalResult, Projection};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response, write_text};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Markup options (optional, defaults per option)
    #[serde(default)]
    pub markup: MarkupOptions,

    /// Minimum log severity: trace, info, warn or error (optional)
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_text = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", path_text.as_str())]);
        Ok(config)
    }

    /// Load configuration if a path was given, defaults otherwise
    pub fn load_optional(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.markup
            .validate()
            .map_err(|e| CliError::config_error(format!("Invalid markup options: {}", e)))?;
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Option<Severity>> {
        match &self.log_level {
            None => Ok(None),
            Some(level) => Severity::parse(level).map(Some).ok_or_else(|| {
                CliError::config_error(format!(
                    "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                    level
                ))
            }),
        }
    }

    /// Applies the log level, if one is configured
    pub fn apply(&self) -> CliResult<()> {
        if let Some(severity) = self.severity()? {
            Logger::set_min_severity(severity);
        }
        Ok(())
    }
}

/// Parse arguments, run the command, and report failures on stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match run_command(cli.command) {
        Ok(()) => Ok(()),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Render {
            fixture,
            config,
            view,
            names,
            options,
        } => {
            let overrides = MarkupOverrides {
                view,
                names,
                options,
            };
            let xml = render(&fixture, config.as_deref(), &overrides)?;
            write_text(&xml)
        }
        Command::Fetch {
            fixture,
            config,
            projection,
        } => write_response(fetch(&fixture, config.as_deref(), projection)?),
        Command::Column {
            fixture,
            config,
            column: reference,
        } => write_response(column(&fixture, config.as_deref(), &reference)?),
    }
}

/// Markup options given on the command line; these win over the config file
#[derive(Debug, Clone, Default)]
pub struct MarkupOverrides {
    pub view: Option<String>,
    pub names: Option<String>,
    /// `KEY=VALUE` pairs
    pub options: Vec<String>,
}

impl MarkupOverrides {
    fn apply(&self, options: &mut MarkupOptions) -> CliResult<()> {
        if let Some(view) = &self.view {
            options.view = view.clone();
        }
        if let Some(names) = &self.names {
            options.names = names.clone();
        }
        for pair in &self.options {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                CliError::config_error(format!("Invalid option '{}'. Expected KEY=VALUE.", pair))
            })?;
            options.set(key.trim(), value.trim())?;
        }
        Ok(())
    }
}

fn open(fixture: &Path, config: &Config) -> CliResult<QueryResult> {
    config.apply()?;
    let fixture = Fixture::load(fixture)?;
    Ok(fixture.open()?)
}

/// Render the fixture's result set as markup
pub fn render(
    fixture: &Path,
    config_path: Option<&Path>,
    overrides: &MarkupOverrides,
) -> CliResult<String> {
    let config = Config::load_optional(config_path)?;
    let mut options = config.markup.clone();
    overrides.apply(&mut options)?;

    // Options are checked before the fixture is touched.
    let markup_config = options.validate()?;
    let mut result = open(fixture, &config)?;
    Ok(markup::render_result(&mut result, &markup_config)?)
}

/// Fetch every row of the fixture's result set
pub fn fetch(fixture: &Path, config_path: Option<&Path>, projection: Projection) -> CliResult<Value> {
    let config = Config::load_optional(config_path)?;
    let mut result = open(fixture, &config)?;
    Ok(result.fetch_all(projection)?)
}

/// Every value of one column
pub fn column(fixture: &Path, config_path: Option<&Path>, column: &ColumnRef) -> CliResult<Value> {
    let config = Config::load_optional(config_path)?;
    let mut result = open(fixture, &config)?;
    Ok(Value::Array(result.get_column_values(column)?))
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(temp_dir: &TempDir) -> std::path::PathBuf {
        let path = temp_dir.path().join("fixture.json");
        let fixture = json!({
            "tables": {
                "customers": {
                    "fields": ["id", "name"],
                    "rows": [[1, "Ann"], [2, "Bo"]]
                },
                "orders": {
                    "fields": ["id", "customer_id", "item"],
                    "rows": [[10, 1, "pen"], [11, 1, "ink"], [12, 2, "cup"]]
                }
            },
            "query": {
                "table": "customers",
                "bindings": [{
                    "name": "orders",
                    "parent_join": "id",
                    "child_join": "customer_id",
                    "query": {"table": "orders"}
                }]
            }
        });
        fs::write(&path, fixture.to_string()).unwrap();
        path
    }

    #[test]
    fn test_fetch_ordered() {
        let temp_dir = TempDir::new().unwrap();
        let fixture = write_fixture(&temp_dir);

        let data = fetch(&fixture, None, Projection::Ordered).unwrap();
        assert_eq!(
            data,
            json!([[1, "Ann", [[10, 1, "pen"], [11, 1, "ink"]]], [2, "Bo", [[12, 2, "cup"]]]])
        );
    }

    #[test]
    fn test_column_values() {
        let temp_dir = TempDir::new().unwrap();
        let fixture = write_fixture(&temp_dir);

        let data = column(&fixture, None, &ColumnRef::name("name")).unwrap();
        assert_eq!(data, json!(["Ann", "Bo"]));

        let err = column(&fixture, None, &ColumnRef::name("email")).unwrap_err();
        assert_eq!(err.code_str(), "Q_NOT_FOUND");
    }

    #[test]
    fn test_render_with_config_and_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let fixture = write_fixture(&temp_dir);
        let config_path = temp_dir.path().join("qresult.json");
        fs::write(
            &config_path,
            json!({"markup": {"view": "standard", "declaration": false}, "log_level": "error"})
                .to_string(),
        )
        .unwrap();

        let overrides = MarkupOverrides {
            view: Some("attributes".to_string()),
            options: vec!["root=customers".to_string()],
            ..Default::default()
        };
        let xml = render(&fixture, Some(&config_path), &overrides).unwrap();
        assert!(xml.starts_with(r#"<customers><row id="1" name="Ann"><orders>"#));
    }

    #[test]
    fn test_render_bogus_view() {
        let temp_dir = TempDir::new().unwrap();
        let fixture = write_fixture(&temp_dir);
        let overrides = MarkupOverrides {
            view: Some("bogus".to_string()),
            ..Default::default()
        };
        let err = render(&fixture, None, &overrides).unwrap_err();
        assert_eq!(err.code_str(), "Q_UNSUPPORTED_VIEW");
    }

    #[test]
    fn test_config_rejects_bad_log_level() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qresult.json");
        fs::write(&config_path, json!({"log_level": "loud"}).to_string()).unwrap();

        let err = Config::load(&config_path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_config_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("qresult.json");
        fs::write(&config_path, "{}").unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.markup, MarkupOptions::default());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_missing_fixture() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        let err = fetch(&missing, None, Projection::Associative).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::FixtureError);
    }
}
