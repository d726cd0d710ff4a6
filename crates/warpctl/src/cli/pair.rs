use std::fs::read_to_string;

use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{Result as EyreResult, WrapErr};
use tracing::info;
use warpnet_client::{ClientConfig, ClientSession, Psk};
use warpnet_mobile::PairingPayload;

use crate::cli::{connect_any, RootArgs};
use crate::config::{ConfigFile, DesktopConfig};

/// Connect using the desktop node's pairing payload and save it as config
#[derive(Debug, Parser)]
pub struct PairCommand {
    /// File holding the pairing JSON shown by the desktop node
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,
}

impl PairCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let content = read_to_string(&self.file)
            .wrap_err_with(|| format!("failed to read pairing payload from {:?}", self.file))?;

        let payload = PairingPayload::parse(&content)?;

        let psk = payload
            .psk
            .as_deref()
            .map(Psk::from_base64)
            .transpose()?;

        let client = match ConfigFile::exists(&root_args.home) {
            true => ConfigFile::load(&root_args.home)?.client.with_psk(psk),
            false => ClientConfig::default().with_psk(psk),
        };

        let session = ClientSession::new(client.clone()).await?;

        let connected = connect_any(&session, &payload.peer_id, &payload.addresses).await;

        session.close().await?;

        let address = connected?;

        info!(peer_id = %payload.peer_id, %address, "Paired with desktop node");

        ConfigFile {
            desktop: DesktopConfig {
                peer_id: payload.peer_id,
                addresses: payload.addresses,
            },
            client,
        }
        .save(&root_args.home)?;

        println!("Paired with {address}, config saved in {:?}", root_args.home);

        Ok(())
    }
}
