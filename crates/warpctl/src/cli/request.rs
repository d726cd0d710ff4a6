use clap::Parser;
use eyre::{bail, Result as EyreResult};
use tokio::io::{stdin, stdout, AsyncReadExt, AsyncWriteExt};
use tracing::info;
use warpnet_client::{ClientConfig, ClientSession};

use crate::cli::{connect_any, RootArgs};
use crate::config::ConfigFile;

/// Send one request to the desktop node and print the response
#[derive(Debug, Parser)]
pub struct RequestCommand {
    /// Protocol ID, e.g. /warpnet/api/feed/1.0.0
    #[arg(value_name = "PROTOCOL")]
    pub protocol: String,

    /// Request body. Read from stdin when omitted
    #[arg(value_name = "PAYLOAD")]
    pub payload: Option<String>,

    /// Desktop peer ID, overriding the config
    #[arg(long, value_name = "PEER_ID", requires = "addresses")]
    pub peer_id: Option<String>,

    /// Desktop multiaddr, overriding the config, repeatable
    #[arg(long = "address", value_name = "MULTIADDR")]
    pub addresses: Vec<String>,
}

impl RequestCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let (client_config, peer_id, addresses) = match self.peer_id {
            Some(peer_id) => {
                let client = if ConfigFile::exists(&root_args.home) {
                    ConfigFile::load(&root_args.home)?.client
                } else {
                    ClientConfig::default()
                };
                (client, peer_id, self.addresses)
            }
            None if ConfigFile::exists(&root_args.home) => {
                let config = ConfigFile::load(&root_args.home)?;
                (config.client, config.desktop.peer_id, config.desktop.addresses)
            }
            None => bail!(
                "No config in {:?}, run `warpctl init` or pass --peer-id and --address",
                root_args.home
            ),
        };

        let payload = match self.payload {
            Some(payload) => payload.into_bytes(),
            None => {
                let mut payload = Vec::new();
                let _read = stdin().read_to_end(&mut payload).await?;
                payload
            }
        };

        let session = ClientSession::new(client_config).await?;

        let result = async {
            let address = connect_any(&session, &peer_id, &addresses).await?;
            info!(%peer_id, %address, protocol = %self.protocol, "Sending request");

            let response = session.send_message(&self.protocol, &payload).await?;

            let mut out = stdout();
            out.write_all(&response).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;

            EyreResult::<()>::Ok(())
        }
        .await;

        session.close().await?;

        result
    }
}
