use borsh::{BorshDeserialize, BorshSerialize};
use ferry_primitives::{
    crypto::TX_SIGNATURE_CONTEXT, Address, BaseUnits, ContextPolicy, PublicKey, Signature,
    SignatureContext, Signer,
};
use serde::{Deserialize, Serialize};

use crate::{MalformedReason, TxError};

/// The only envelope version currently accepted.
pub const LATEST_TRANSACTION_VERSION: u16 = 1;

/// A method invocation with an opaque body.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Call {
    method: String,
    #[serde(with = "hex::serde")]
    body: Vec<u8>,
}

impl Call {
    pub fn new(method: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: method.into(),
            body,
        }
    }

    /// Call whose body is the borsh encoding of `body`.
    pub fn with_body<T: BorshSerialize>(method: impl Into<String>, body: &T) -> Result<Self, TxError> {
        Ok(Self::new(method, borsh::to_vec(body)?))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// A declared signer and the nonce its signature commits to.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignerInfo {
    #[serde(rename = "pub")]
    public_key: PublicKey,
    nonce: u64,
}

impl SignerInfo {
    pub fn new(public_key: PublicKey, nonce: u64) -> Self {
        Self { public_key, nonce }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn address(&self) -> Address {
        Address::from_pk(&self.public_key)
    }
}

#[derive(
    Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct Fee {
    amount: BaseUnits,
    gas: u64,
}

impl Fee {
    pub fn new(amount: BaseUnits, gas: u64) -> Self {
        Self { amount, gas }
    }

    pub fn amount(&self) -> &BaseUnits {
        &self.amount
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }
}

/// Signers and fee: the authentication half of the envelope.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthInfo {
    #[serde(rename = "si")]
    signer_info: Vec<SignerInfo>,
    fee: Fee,
}

impl AuthInfo {
    pub fn signer_info(&self) -> &[SignerInfo] {
        &self.signer_info
    }

    pub fn fee(&self) -> &Fee {
        &self.fee
    }
}

/// A signed call envelope.
///
/// Signatures are positionally paired with [`AuthInfo::signer_info`] and cover the
/// canonical encoding of everything except the signatures themselves.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    #[serde(rename = "v")]
    version: u16,
    call: Call,
    #[serde(rename = "ai")]
    auth_info: AuthInfo,
    #[serde(rename = "sigs")]
    signatures: Vec<Signature>,
}

impl Transaction {
    /// Builds an unsigned envelope at the latest version.
    pub fn new(call: Call, signer_info: Vec<SignerInfo>, fee: Fee) -> Self {
        Self {
            version: LATEST_TRANSACTION_VERSION,
            call,
            auth_info: AuthInfo { signer_info, fee },
            signatures: Vec::new(),
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Address of the first signer, which is the caller for dispatch purposes.
    pub fn caller(&self) -> Option<Address> {
        self.auth_info.signer_info.first().map(SignerInfo::address)
    }

    /// Canonical bytes covered by every signature.
    pub fn signing_payload(&self) -> Result<Vec<u8>, TxError> {
        Ok(borsh::to_vec(&(self.version, &self.call, &self.auth_info))?)
    }

    /// Appends the next signature. `signer` must own the key declared at that position.
    pub fn append_sign(&mut self, signer: &dyn Signer) -> Result<(), TxError> {
        let index = self.signatures.len();
        let declared = self
            .auth_info
            .signer_info
            .get(index)
            .ok_or(TxError::AlreadyFullySigned(index))?;
        if declared.public_key != signer.public_key() {
            return Err(TxError::SignerMismatch { index });
        }

        let payload = self.signing_payload()?;
        let sig = signer.sign(&SignatureContext::from(TX_SIGNATURE_CONTEXT), &payload)?;
        self.signatures.push(sig);
        Ok(())
    }

    /// Structural checks, in order: version, at least one signature, one signature per
    /// signer.
    pub fn validate_basic(&self) -> Result<(), TxError> {
        if self.version != LATEST_TRANSACTION_VERSION {
            return Err(MalformedReason::UnsupportedVersion(self.version).into());
        }
        if self.signatures.is_empty() {
            return Err(MalformedReason::NoSignatures.into());
        }
        if self.signatures.len() != self.auth_info.signer_info.len() {
            return Err(MalformedReason::SignatureCountMismatch {
                signers: self.auth_info.signer_info.len(),
                signatures: self.signatures.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Verifies every signature against its paired signer. Assumes [`Self::validate_basic`]
    /// passed.
    pub fn verify_signatures(&self, policy: &ContextPolicy) -> Result<(), TxError> {
        let payload = self.signing_payload()?;
        let context = SignatureContext::from(TX_SIGNATURE_CONTEXT);
        for (index, (info, sig)) in self
            .auth_info
            .signer_info
            .iter()
            .zip(&self.signatures)
            .enumerate()
        {
            info.public_key
                .try_verify(policy, &context, &payload, sig)
                .map_err(|source| TxError::InvalidSignature { index, source })?;
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, TxError> {
        Ok(borsh::to_vec(self)?)
    }

    /// Decodes an envelope. The version is checked before anything else is read, so an
    /// unsupported version never yields a partially decoded transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, TxError> {
        let version_bytes: [u8; 2] = raw
            .get(..2)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| MalformedReason::Encoding("truncated version".to_owned()))?;
        let version = u16::from_le_bytes(version_bytes);
        if version != LATEST_TRANSACTION_VERSION {
            return Err(MalformedReason::UnsupportedVersion(version).into());
        }
        borsh::from_slice(raw).map_err(|e| MalformedReason::Encoding(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use ferry_primitives::{Denomination, Ed25519Signer};
    use proptest::prelude::*;

    use super::*;

    fn signers(n: u8) -> Vec<Ed25519Signer> {
        (0..n).map(|i| Ed25519Signer::from_seed([i + 1; 32])).collect()
    }

    fn unsigned(signers: &[Ed25519Signer]) -> Transaction {
        let infos = signers
            .iter()
            .enumerate()
            .map(|(i, s)| SignerInfo::new(s.public_key(), i as u64))
            .collect();
        Transaction::new(
            Call::new("bridge.Lock", vec![1, 2, 3]),
            infos,
            Fee::new(BaseUnits::native(0u64), 1000),
        )
    }

    fn signed(signers: &[Ed25519Signer]) -> Transaction {
        let mut tx = unsigned(signers);
        for s in signers {
            tx.append_sign(s).unwrap();
        }
        tx
    }

    #[test]
    fn test_validate_basic_order() {
        let s = signers(2);
        let mut tx = unsigned(&s);
        assert!(matches!(
            tx.validate_basic(),
            Err(TxError::Malformed(MalformedReason::NoSignatures))
        ));

        tx.append_sign(&s[0]).unwrap();
        assert!(matches!(
            tx.validate_basic(),
            Err(TxError::Malformed(MalformedReason::SignatureCountMismatch {
                signers: 2,
                signatures: 1
            }))
        ));

        tx.append_sign(&s[1]).unwrap();
        tx.validate_basic().unwrap();

        tx.version = 2;
        assert!(matches!(
            tx.validate_basic(),
            Err(TxError::Malformed(MalformedReason::UnsupportedVersion(2)))
        ));
    }

    #[test]
    fn test_append_sign_checks_signer() {
        let s = signers(2);
        let mut tx = unsigned(&s);
        assert!(matches!(
            tx.append_sign(&s[1]),
            Err(TxError::SignerMismatch { index: 0 })
        ));
        tx.append_sign(&s[0]).unwrap();
        tx.append_sign(&s[1]).unwrap();
        assert!(matches!(
            tx.append_sign(&s[1]),
            Err(TxError::AlreadyFullySigned(2))
        ));
    }

    #[test]
    fn test_verify_signatures() {
        let s = signers(2);
        let tx = signed(&s);
        tx.verify_signatures(&ContextPolicy::default()).unwrap();

        let mut tampered = tx.clone();
        tampered.auth_info.signer_info[1].nonce += 1;
        assert!(matches!(
            tampered.verify_signatures(&ContextPolicy::default()),
            Err(TxError::InvalidSignature { index: 0, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_unsupported_version() {
        let s = signers(1);
        let mut tx = signed(&s);
        tx.version = 7;
        let raw = borsh::to_vec(&tx).unwrap();
        assert!(matches!(
            Transaction::decode(&raw),
            Err(TxError::Malformed(MalformedReason::UnsupportedVersion(7)))
        ));
        assert!(matches!(
            Transaction::decode(&[1]),
            Err(TxError::Malformed(MalformedReason::Encoding(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let tx = signed(&signers(1));
        let mut raw = tx.encode().unwrap();
        raw.push(0);
        assert!(Transaction::decode(&raw).unwrap_err().is_malformed());
    }

    #[test]
    fn test_json_field_names() {
        let tx = signed(&signers(1));
        let json = serde_json::to_value(&tx).unwrap();
        assert!(json.get("v").is_some());
        assert!(json.get("ai").and_then(|ai| ai.get("si")).is_some());
        assert!(json.get("sigs").is_some());
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    proptest! {
        #[test]
        fn proptest_signed_counts_match(n in 1u8..6, body in prop::collection::vec(any::<u8>(), 0..64)) {
            let s = signers(n);
            let infos = s.iter().map(|s| SignerInfo::new(s.public_key(), 0)).collect();
            let mut tx = Transaction::new(
                Call::new("bridge.Witness", body),
                infos,
                Fee::new(BaseUnits::new(5u64, Denomination::new("FERRY")), 10),
            );
            for signer in &s {
                tx.append_sign(signer).unwrap();
            }
            prop_assert_eq!(tx.signatures().len(), n as usize);
            prop_assert_eq!(tx.auth_info().signer_info().len(), n as usize);
            prop_assert!(tx.validate_basic().is_ok());

            let dec = Transaction::decode(&tx.encode().unwrap()).unwrap();
            prop_assert_eq!(dec, tx);
        }
    }
}
