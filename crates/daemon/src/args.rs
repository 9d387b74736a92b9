// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use clap::builder::ValueHint;
use clap_derive::Parser;
use eyre::eyre;
use figment::Figment;
use figment::providers::{Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use warren_db::DatabaseConfig;
use warren_kernel::Config;

/// Everything the daemon is configured with: the kernel's settings plus where the world lives.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    #[serde(flatten)]
    pub kernel: Config,
    pub db: DatabaseConfig,
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct Args {
    #[arg(
        value_name = "data-dir",
        help = "Directory to store all database files under",
        value_hint = ValueHint::DirPath,
        default_value = "./warren-data"
    )]
    pub data_dir: PathBuf,

    #[command(flatten)]
    pub db_args: DatabaseArgs,

    #[command(flatten)]
    pub eval_args: EvalArgs,

    #[arg(
        long,
        value_name = "config",
        help = "Path to configuration (YAML) file to use, if any. If not specified, defaults are used.\
                Configuration file values can be overridden by command line arguments.",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[arg(
        long,
        value_name = "player",
        help = "Id of the programmer the console evaluates as",
        default_value = "test"
    )]
    pub player: String,

    #[arg(long, help = "Enable debug logging", default_value = "false")]
    pub debug: bool,
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct DatabaseArgs {
    #[arg(
        long,
        value_name = "db",
        help = "Main database directory (relative to data-dir if not absolute)",
        value_hint = ValueHint::DirPath,
        default_value = "world.db"
    )]
    pub db: PathBuf,

    #[arg(
        long,
        help = "Keep the world in memory only; nothing is written to disk",
        default_value = "false"
    )]
    pub in_memory: bool,
}

impl DatabaseArgs {
    fn merge_config(&self, db_config: &mut DatabaseConfig, data_dir: &Path) {
        if db_config.path.is_none() {
            db_config.path = Some(resolve(data_dir, &self.db));
        }
        if self.in_memory {
            db_config.in_memory = true;
        }
    }
}

#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct EvalArgs {
    #[arg(
        long,
        value_name = "print-depth",
        help = "Levels of nested values expanded when printing a result"
    )]
    pub print_depth: Option<usize>,

    #[arg(
        long,
        value_name = "max-steps",
        help = "Statements and calls a single turn may execute before it is aborted"
    )]
    pub max_steps: Option<usize>,

    #[arg(
        long,
        value_name = "max-results",
        help = "Most results a search returns"
    )]
    pub max_results: Option<usize>,
}

impl EvalArgs {
    fn merge_config(&self, config: &mut Config) {
        if let Some(print_depth) = self.print_depth {
            config.eval.print_depth = print_depth;
        }
        if let Some(max_steps) = self.max_steps {
            config.eval.max_steps = Some(max_steps);
        }
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }
    }
}

fn resolve(data_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}

impl Args {
    fn merge_config(&self, mut config: DaemonConfig) -> DaemonConfig {
        self.db_args.merge_config(&mut config.db, &self.data_dir);
        self.eval_args.merge_config(&mut config.kernel);
        config
    }

    /// Load the configuration file if we have it, and then merge the arguments into it.
    pub fn load_config(&self) -> Result<DaemonConfig, eyre::Report> {
        let config = match &self.config_file {
            Some(config_path) => Figment::new()
                .merge(Serialized::defaults(DaemonConfig::default()))
                .merge(Yaml::file(config_path))
                .extract::<DaemonConfig>()
                .map_err(|e| {
                    eyre!(
                        "Failed to parse configuration from {:?}: {}",
                        config_path,
                        e
                    )
                })?,
            None => DaemonConfig::default(),
        };
        Ok(self.merge_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("warren-daemon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).load_config().unwrap();
        assert_eq!(
            config.db.path,
            Some(PathBuf::from("./warren-data").join("world.db"))
        );
        assert!(!config.db.in_memory);
        assert_eq!(config.kernel, Config::default());
    }

    #[test]
    fn test_absolute_db_path_ignores_data_dir() {
        let config = parse(&["/tmp/data", "--db", "/srv/world"])
            .load_config()
            .unwrap();
        assert_eq!(config.db.path, Some(PathBuf::from("/srv/world")));
    }

    #[test]
    fn test_file_then_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "eval:\n  print_depth: 3\n  max_steps: 500\nsearch:\n  max_results: 10\ndb:\n  in_memory: true"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = parse(&["--config-file", &path]).load_config().unwrap();
        assert_eq!(config.kernel.eval.print_depth, 3);
        assert_eq!(config.kernel.eval.max_steps, Some(500));
        assert_eq!(config.kernel.search.max_results, 10);
        assert!(config.db.in_memory);

        let config = parse(&["--config-file", &path, "--print-depth", "0"])
            .load_config()
            .unwrap();
        assert_eq!(config.kernel.eval.print_depth, 0);
        assert_eq!(config.kernel.eval.max_steps, Some(500));
    }

    #[test]
    fn test_bad_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "eval:\n  print_depth: deep").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert!(parse(&["--config-file", &path]).load_config().is_err());
    }
}
