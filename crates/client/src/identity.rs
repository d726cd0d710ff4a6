use libp2p::identity::{ed25519, DecodingError, Keypair};
use libp2p::PeerId;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum KeyGenerationError {
    #[error("failed to read from the OS random source: {0}")]
    Randomness(#[from] rand::Error),
    #[error("failed to derive signing key: {0}")]
    InvalidKey(#[from] DecodingError),
}

/// The session's signing keypair and the peer id derived from it.
#[derive(Clone, Debug)]
pub struct Identity {
    keypair: Keypair,
    peer_id: PeerId,
}

impl Identity {
    /// Generates a fresh Ed25519 keypair from the OS random source.
    pub fn generate() -> Result<Self, KeyGenerationError> {
        let mut secret = [0_u8; 32];
        OsRng.try_fill_bytes(&mut secret)?;

        // Zeroizes `secret` on the way in.
        let secret = ed25519::SecretKey::try_from_bytes(&mut secret)?;

        Ok(Self::from_keypair(ed25519::Keypair::from(secret).into()))
    }

    #[must_use]
    pub fn from_keypair(keypair: Keypair) -> Self {
        let peer_id = keypair.public().to_peer_id();

        Self { keypair, peer_id }
    }

    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    #[must_use]
    pub const fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    #[must_use]
    pub fn into_keypair(self) -> Keypair {
        self.keypair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_peer_ids_are_ed25519() -> Result<(), KeyGenerationError> {
        let identity = Identity::generate()?;

        let peer_id = identity.peer_id().to_string();
        assert!(peer_id.starts_with("12D3KooW"), "unexpected peer id {peer_id}");
        assert_eq!(identity.keypair().public().to_peer_id(), identity.peer_id());

        Ok(())
    }

    #[test]
    fn test_generated_identities_differ() -> Result<(), KeyGenerationError> {
        let first = Identity::generate()?;
        let second = Identity::generate()?;

        assert_ne!(first.peer_id(), second.peer_id());

        Ok(())
    }

    #[test]
    fn test_from_keypair_derives_peer_id() {
        let keypair = Keypair::generate_ed25519();
        let expected = keypair.public().to_peer_id();

        assert_eq!(Identity::from_keypair(keypair).peer_id(), expected);
    }
}
