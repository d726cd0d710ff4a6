use core::time::Duration;

use clap::Parser;
use eyre::{eyre, Result as EyreResult, WrapErr};
use futures_util::StreamExt;
use tokio::signal::ctrl_c;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use warpnet_client::{ClientConfig, ClientSession, Multiaddr, Psk, StreamProtocol};
use warpnet_network::stack::ProtocolStream;
use warpnet_network::stream::{IncomingStreams, Stream};

use crate::cli::RootArgs;
use crate::config::ConfigFile;
use crate::defaults::{DEFAULT_ECHO_PROTOCOL, DEFAULT_LISTEN_ADDR};

const MAX_REQUEST_SIZE: usize = 8 * 1_024 * 1_024;

const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

/// Listen for requests and send every payload straight back
#[derive(Debug, Parser)]
pub struct EchoCommand {
    /// Address to listen on, repeatable
    #[arg(long = "listen", value_name = "MULTIADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: Vec<Multiaddr>,

    /// Protocol to answer, repeatable
    #[arg(long = "protocol", value_name = "PROTOCOL", default_value = DEFAULT_ECHO_PROTOCOL)]
    pub protocols: Vec<String>,

    /// Base64 private network key, overriding the config
    #[arg(long, value_name = "BASE64")]
    pub psk: Option<String>,
}

impl EchoCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let mut config = if ConfigFile::exists(&root_args.home) {
            ConfigFile::load(&root_args.home)?.client
        } else {
            ClientConfig::default()
        };

        if let Some(psk) = self.psk.as_deref() {
            config = config.with_psk(Some(Psk::from_base64(psk).wrap_err("invalid --psk")?));
        }

        let session = ClientSession::new(config).await?;

        for address in self.listen {
            let address = session.listen_on(address).await?;
            println!("{address}/p2p/{}", session.peer_id());
        }

        for protocol in self.protocols {
            let protocol = StreamProtocol::try_from_owned(protocol)
                .map_err(|_| eyre!("protocol IDs must start with '/'"))?;

            info!(%protocol, "Echoing requests");

            drop(tokio::spawn(serve(session.accept(protocol)?)));
        }

        ctrl_c().await?;

        info!("Shutting down");

        session.close().await?;

        Ok(())
    }
}

async fn serve(mut incoming: IncomingStreams) {
    while let Some((peer_id, stream)) = incoming.next().await {
        debug!(%peer_id, "Incoming request");

        drop(tokio::spawn(async move {
            if let Err(err) = echo(stream).await {
                warn!(%peer_id, %err, "Failed to echo request");
            }
        }));
    }
}

async fn echo(mut stream: Stream) -> std::io::Result<()> {
    let deadline = Instant::now() + REQUEST_DEADLINE;

    let request = stream.read_to_end(deadline, MAX_REQUEST_SIZE).await?;
    stream.write_all(&request, deadline).await?;
    stream.close_write(deadline).await?;

    stream.close().await
}
