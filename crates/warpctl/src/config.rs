use std::fs::{create_dir_all, read_to_string, write};

use camino::Utf8Path;
use eyre::{Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use warpnet_client::ClientConfig;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    pub desktop: DesktopConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// The desktop node this client talks to.
#[derive(Debug, Deserialize, Serialize)]
pub struct DesktopConfig {
    pub peer_id: String,
    /// Tried in order until one connects.
    pub addresses: Vec<String>,
}

impl ConfigFile {
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path:?}"))?;

        toml::from_str(&content).map_err(Into::into)
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        create_dir_all(dir).wrap_err_with(|| format!("failed to create directory {dir:?}"))?;

        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path:?}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempdir::TempDir;
    use warpnet_client::Psk;

    use super::*;

    #[test]
    fn test_save_and_load() -> EyreResult<()> {
        let temp = TempDir::new("warpctl")?;
        let dir = Utf8PathBuf::try_from(temp.path().join("home"))?;

        assert!(!ConfigFile::exists(&dir), "fresh directory has no config");

        let psk = Psk::from_base64("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=")?;

        ConfigFile {
            desktop: DesktopConfig {
                peer_id: "12D3KooWTestPeerID".to_owned(),
                addresses: vec!["/ip4/192.168.1.20/tcp/4001".to_owned()],
            },
            client: ClientConfig::default().with_psk(Some(psk)),
        }
        .save(&dir)?;

        assert!(ConfigFile::exists(&dir), "config should exist after save");

        let config = ConfigFile::load(&dir)?;
        assert_eq!(config.desktop.peer_id, "12D3KooWTestPeerID");
        assert_eq!(config.desktop.addresses.len(), 1);
        assert_eq!(config.client.psk, Some(psk));

        Ok(())
    }

    #[test]
    fn test_client_section_is_optional() -> EyreResult<()> {
        let config: ConfigFile = toml::from_str(
            r#"
            [desktop]
            peer_id = "12D3KooWTestPeerID"
            addresses = []
            "#,
        )?;

        assert!(config.client.psk.is_none(), "psk defaults to none");

        Ok(())
    }
}
