use clap::Parser;
use eyre::Result as EyreResult;
use warpnet_client::identity::Identity;

/// Print a freshly generated client peer ID
#[derive(Debug, Parser)]
pub struct PeerIdCommand;

impl PeerIdCommand {
    pub fn run(self) -> EyreResult<()> {
        let identity = Identity::generate()?;

        println!("{}", identity.peer_id());

        Ok(())
    }
}
