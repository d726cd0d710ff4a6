use clap::Parser;
use eyre::{bail, Result as EyreResult, WrapErr};
use tracing::info;
use warpnet_client::{ClientConfig, Multiaddr, PeerId, Psk};

use crate::cli::RootArgs;
use crate::config::{ConfigFile, DesktopConfig};

/// Save the desktop node's connection details
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Peer ID of the desktop node
    #[arg(long, value_name = "PEER_ID")]
    pub peer_id: PeerId,

    /// Multiaddr of the desktop node, repeatable
    #[arg(long = "address", value_name = "MULTIADDR", required = true)]
    pub addresses: Vec<Multiaddr>,

    /// Base64 private network key shared with the desktop node
    #[arg(long, value_name = "BASE64")]
    pub psk: Option<String>,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let home = &root_args.home;

        if ConfigFile::exists(home) && !self.force {
            bail!("Config already exists in {home:?}, pass --force to overwrite");
        }

        let psk = self
            .psk
            .as_deref()
            .map(Psk::from_base64)
            .transpose()
            .wrap_err("invalid --psk")?;

        let config = ConfigFile {
            desktop: DesktopConfig {
                peer_id: self.peer_id.to_string(),
                addresses: self.addresses.iter().map(ToString::to_string).collect(),
            },
            client: ClientConfig::default().with_psk(psk),
        };

        config.save(home)?;

        info!(peer_id = %self.peer_id, private = psk.is_some(), "Saved config in {home:?}");

        Ok(())
    }
}
