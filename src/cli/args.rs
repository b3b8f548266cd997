//! CLI argument definitions using clap
//!
//! Commands:
//! - qresult render --fixture <path> [--config <path>] [--view <view>] [--names <names>]
//! - qresult fetch --fixture <path> [--projection <projection>]
//! - qresult column --fixture <path> --column <name|#index|@role>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::ColumnRef;
use crate::result::Projection;

/// qresult - hierarchical results over flat relational rows
#[derive(Parser, Debug)]
#[command(name = "qresult")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a fixture's result set as XML
    Render {
        /// Path to fixture file
        #[arg(long)]
        fixture: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// View: attributes, forest or standard
        #[arg(long)]
        view: Option<String>,

        /// Column labels: fieldnames or roles
        #[arg(long)]
        names: Option<String>,

        /// Any other markup option, as KEY=VALUE
        #[arg(long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,
    },

    /// Fetch every row of a fixture's result set as JSON
    Fetch {
        /// Path to fixture file
        #[arg(long)]
        fixture: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Row shape: ordered, associative, full, per_table or roles
        #[arg(long, default_value = "associative")]
        projection: Projection,
    },

    /// Print every value of one column as JSON
    Column {
        /// Path to fixture file
        #[arg(long)]
        fixture: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Column name, `#index` or `@role`
        #[arg(long, value_parser = parse_column)]
        column: ColumnRef,
    },
}

fn parse_column(s: &str) -> Result<ColumnRef, std::convert::Infallible> {
    s.parse()
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::parse_from([
            "qresult", "render", "--fixture", "f.json", "--view", "forest", "--option", "root=people",
        ]);
        match cli.command {
            Command::Render { fixture, view, options, config, .. } => {
                assert_eq!(fixture, PathBuf::from("f.json"));
                assert_eq!(view.as_deref(), Some("forest"));
                assert_eq!(options, vec!["root=people".to_string()]);
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_fetch_projection() {
        let cli = Cli::parse_from(["qresult", "fetch", "--fixture", "f.json", "--projection", "per_table"]);
        assert!(matches!(
            cli.command,
            Command::Fetch { projection: Projection::PerTable, .. }
        ));
        assert!(Cli::try_parse_from(["qresult", "fetch", "--fixture", "f.json", "--projection", "nope"]).is_err());
    }

    #[test]
    fn test_parse_column_reference() {
        let cli = Cli::parse_from(["qresult", "column", "--fixture", "f.json", "--column", "@result:key"]);
        match cli.command {
            Command::Column { column, .. } => assert_eq!(column, ColumnRef::role("result:key")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_column_every_form() {
        let cases = [
            ("#2", ColumnRef::Index(2)),
            ("@tree:left", ColumnRef::role("tree:left")),
            ("name", ColumnRef::name("name")),
        ];
        for (text, expected) in cases {
            let cli =
                Cli::try_parse_from(["qresult", "column", "--fixture", "f.json", "--column", text])
                    .unwrap();
            match cli.command {
                Command::Column { column, .. } => assert_eq!(column, expected, "{}", text),
                other => panic!("unexpected command {:?}", other),
            }
        }
    }
}
