use crate::admin::roles::AccountRole;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct AppConfig {
    pub root: PathBuf,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let root = if args.len() > 1 {
            PathBuf::from(&args[1])
        } else {
            match std::env::var("ELDERMOOR_ROOT") {
                Ok(value) if !value.trim().is_empty() => PathBuf::from(value.trim().to_string()),
                _ => return Err("usage: eldermoor <server-root>".to_string()),
            }
        };
        Ok(Self { root })
    }
}

/// Gameplay limits and console identity, read from `server.yml` in the
/// server root. A missing file means stock defaults; a malformed one is a
/// startup error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_level: u16,
    pub max_spell_level: u8,
    pub inventory_capacity: usize,
    pub console_email: String,
    pub console_role: u8,
    pub grid_cache_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            max_level: 60,
            max_spell_level: 3,
            inventory_capacity: 40,
            console_email: "console@eldermoor".to_string(),
            console_role: AccountRole::SuperAdmin.value(),
            grid_cache_capacity: 32,
        }
    }
}

impl GameConfig {
    pub fn load(root: &Path) -> Result<GameConfig, String> {
        let path = root.join("server.yml");
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GameConfig::default());
            }
            Err(err) => {
                return Err(format!("config read failed for {}: {}", path.display(), err));
            }
        };
        let config: GameConfig = serde_yaml::from_str(&data)
            .map_err(|err| format!("config parse failed for {}: {}", path.display(), err))?;
        if AccountRole::from_value(config.console_role).is_none() {
            return Err(format!("console role {} out of range", config.console_role));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "eldermoor-config-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create temp root");
        dir
    }

    #[test]
    fn from_args_takes_the_root_argument() {
        let args = vec!["eldermoor".to_string(), "/srv/realm".to_string()];
        let config = AppConfig::from_args(&args).expect("config");
        assert_eq!(config.root, PathBuf::from("/srv/realm"));
    }

    #[test]
    fn missing_config_file_means_defaults() {
        let root = temp_root("defaults");
        let config = GameConfig::load(&root).expect("load");
        assert_eq!(config.max_level, 60);
        assert_eq!(config.max_spell_level, 3);
        assert_eq!(config.inventory_capacity, 40);
        assert_eq!(config.console_role, AccountRole::SuperAdmin.value());
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn config_file_overrides_selected_fields() {
        let root = temp_root("overrides");
        std::fs::write(
            root.join("server.yml"),
            "max_level: 80\nconsole_email: warden@eldermoor\n",
        )
        .expect("write config");

        let config = GameConfig::load(&root).expect("load");
        assert_eq!(config.max_level, 80);
        assert_eq!(config.console_email, "warden@eldermoor");
        assert_eq!(config.inventory_capacity, 40);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn out_of_range_console_role_is_rejected() {
        let root = temp_root("bad-role");
        std::fs::write(root.join("server.yml"), "console_role: 9\n").expect("write config");

        let err = GameConfig::load(&root).unwrap_err();
        assert!(err.contains("console role 9 out of range"));
        let _ = std::fs::remove_dir_all(&root);
    }
}
