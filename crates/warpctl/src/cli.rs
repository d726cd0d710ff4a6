use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::{bail, Result as EyreResult};
use tracing::warn;
use warpnet_client::ClientSession;

use crate::defaults;

mod echo;
mod init;
mod pair;
mod peer_id;
mod request;

use echo::EchoCommand;
use init::InitCommand;
use pair::PairCommand;
use peer_id::PeerIdCommand;
use request::RequestCommand;

pub const EXAMPLES: &str = r#"
  # Point the client at a desktop node
  $ warpctl init --peer-id 12D3KooW... --address /ip4/192.168.1.20/tcp/4001

  # Or take everything from the node's pairing payload
  $ warpctl pair pairing.json

  # Send one request and print the response
  $ warpctl request /warpnet/api/feed/1.0.0 '{"limit":20}'

  # Act as a stand-in desktop node that echoes requests
  $ warpctl echo --listen /ip4/127.0.0.1/tcp/4001
"#;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  WARPNET_HOME    Directory for config\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    #[command(alias = "id")]
    PeerId(PeerIdCommand),
    #[command(alias = "req")]
    Request(RequestCommand),
    Echo(EchoCommand),
    Pair(PairCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for config
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_home_dir())]
    #[arg(env = "WARPNET_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Init(init) => init.run(&self.args),
            SubCommands::PeerId(peer_id) => peer_id.run(),
            SubCommands::Request(request) => request.run(&self.args).await,
            SubCommands::Echo(echo) => echo.run(&self.args).await,
            SubCommands::Pair(pair) => pair.run(&self.args).await,
        }
    }
}

/// Connects to `peer_id` through the first address that answers.
async fn connect_any(
    session: &ClientSession,
    peer_id: &str,
    addresses: &[String],
) -> EyreResult<String> {
    if addresses.is_empty() {
        bail!("No addresses known for desktop node {peer_id}");
    }

    let mut last_error = None;

    for address in addresses {
        match session.connect(peer_id, address).await {
            Ok(()) => return Ok(address.clone()),
            Err(err) => {
                warn!(%address, %err, "Failed to connect");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) => bail!("connection failed: {err}"),
        None => bail!("connection failed"),
    }
}
