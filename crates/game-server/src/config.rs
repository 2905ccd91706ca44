use std::path::Path;

use anyhow::{bail, Context, Result};
use twenty48_core::SpawnPolicy;

#[derive(Clone, Debug, PartialEq, Default, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub game: Game,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Server {
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Game {
    /// Spawn weights and start tile count for every new session.
    #[serde(default)]
    pub spawn: SpawnPolicy,

    /// Base seed; session `n` is seeded with `seed + n`. Entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Upper bound on live sessions held in memory.
    #[serde(default = "defaults::max_sessions")]
    pub max_sessions: usize,

    /// Expose `PUT /games/:id/board`. Meant for automated tests only.
    #[serde(default)]
    pub debug_hooks: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self {
            spawn: SpawnPolicy::default(),
            seed: None,
            max_sessions: defaults::max_sessions(),
            debug_hooks: false,
        }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.game.spawn.validate().context("invalid [game.spawn]")?;
        if self.game.max_sessions == 0 {
            bail!("game.max_sessions must be at least 1");
        }
        Ok(())
    }
}

mod defaults {
    pub fn host() -> String { "127.0.0.1".to_string() }
    pub fn port() -> u16 { 8000 }
    pub fn max_sessions() -> usize { 64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let cfg = Config::from_toml(file.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.game.spawn.start_tiles, 2);
        assert!(!cfg.game.debug_hooks);
    }

    #[test]
    fn nested_tables_are_read() {
        let file = write_config(
            r#"
            [server]
            port = 9100

            [game]
            seed = 7
            max_sessions = 4
            debug_hooks = true

            [game.spawn]
            four_probability = 0.25
            "#,
        );
        let cfg = Config::from_toml(file.path()).unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.game.seed, Some(7));
        assert_eq!(cfg.game.max_sessions, 4);
        assert!(cfg.game.debug_hooks);
        assert_eq!(cfg.game.spawn.four_probability, 0.25);
        assert_eq!(cfg.game.spawn.start_tiles, 2);
        cfg.validate().unwrap();
    }

    #[test]
    fn invalid_values_fail_validation() {
        let file = write_config("[game.spawn]\nfour_probability = 2.0\n");
        let cfg = Config::from_toml(file.path()).unwrap();
        assert!(cfg.validate().is_err());

        let file = write_config("[game]\nmax_sessions = 0\n");
        assert!(Config::from_toml(file.path()).unwrap().validate().is_err());
    }

    #[test]
    fn malformed_toml_reports_path() {
        let file = write_config("[server\nport = 1");
        let err = Config::from_toml(file.path()).unwrap_err();
        assert!(format!("{err}").contains("failed to parse"));
    }

    #[test]
    fn args_override_file_values() {
        let file = write_config("[server]\nport = 9100\n");
        let args = Args {
            config: Some(file.path().to_path_buf()),
            port: Some(9200),
            host: Some("0.0.0.0".to_string()),
            debug_hooks: true,
            ..Args::default()
        };
        let cfg = args.resolve_config().unwrap();
        assert_eq!(cfg.server.port, 9200);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.game.debug_hooks);
    }
}
