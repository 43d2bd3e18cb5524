use std::{fs, path::Path};

use anyhow::Context;
use ferry_primitives::{Address, Ed25519Signer, Signer};
use tracing::debug;
use zeroize::Zeroizing;

/// Loads an Ed25519 signer from a file holding the hex encoded 32 byte seed.
pub(crate) fn load_signer(path: &Path) -> anyhow::Result<Ed25519Signer> {
    debug!(?path, "loading signing key");
    let encoded = Zeroizing::new(
        fs::read_to_string(path).with_context(|| format!("reading key {}", path.display()))?,
    );
    let seed = Zeroizing::new(
        hex::decode(encoded.trim()).with_context(|| format!("decoding key {}", path.display()))?,
    );
    let signer = Ed25519Signer::try_from_slice(&seed)
        .with_context(|| format!("loading key {}", path.display()))?;

    // Only ever log the address.
    debug!(address = %Address::from_pk(&signer.public_key()), "key loaded");
    Ok(signer)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_signer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", hex::encode([7u8; 32])).unwrap();

        let signer = load_signer(file.path()).unwrap();
        assert_eq!(
            signer.public_key(),
            Ed25519Signer::from_seed([7; 32]).public_key()
        );
    }

    #[test]
    fn test_load_signer_rejects_bad_keys() {
        let mut short = tempfile::NamedTempFile::new().unwrap();
        write!(short, "{}", hex::encode([7u8; 16])).unwrap();
        assert!(load_signer(short.path()).is_err());

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "not hex").unwrap();
        assert!(load_signer(garbage.path()).is_err());

        assert!(load_signer(Path::new("/nonexistent/key.hex")).is_err());
    }
}
