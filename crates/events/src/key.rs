use std::{borrow::Cow, fmt};

use crate::DecodeError;

/// Stable identifier of an event kind: module name and module-scoped code.
///
/// On the wire it is the module name followed by the code as a big-endian `u32`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKey {
    module: Cow<'static, str>,
    code: u32,
}

impl EventKey {
    pub const fn new(module: &'static str, code: u32) -> Self {
        Self {
            module: Cow::Borrowed(module),
            code,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.module.len() + 4);
        out.extend_from_slice(self.module.as_bytes());
        out.extend_from_slice(&self.code.to_be_bytes());
        out
    }

    /// Parses raw key bytes. Requires a non-empty UTF-8 module name.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, DecodeError> {
        if raw.len() <= 4 {
            return Err(DecodeError::MalformedKey(raw.to_vec()));
        }
        let (module, code) = raw.split_at(raw.len() - 4);
        let module =
            std::str::from_utf8(module).map_err(|_| DecodeError::MalformedKey(raw.to_vec()))?;
        let mut code_be = [0u8; 4];
        code_be.copy_from_slice(code);
        Ok(Self {
            module: Cow::Owned(module.to_owned()),
            code: u32::from_be_bytes(code_be),
        })
    }

    /// Exact match against raw key bytes.
    pub fn matches(&self, raw: &[u8]) -> bool {
        raw.len() == self.module.len() + 4
            && raw.starts_with(self.module.as_bytes())
            && raw[self.module.len()..] == self.code.to_be_bytes()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.code)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_layout() {
        let key = EventKey::new("bridge", 3);
        assert_eq!(key.to_bytes(), b"bridge\x00\x00\x00\x03");
    }

    #[test]
    fn test_match_is_exact_not_prefix() {
        let key = EventKey::new("bridge", 1);
        assert!(key.matches(&EventKey::new("bridge", 1).to_bytes()));
        assert!(!key.matches(&EventKey::new("bridge", 2).to_bytes()));
        assert!(!key.matches(&EventKey::new("bridgex", 1).to_bytes()));
        assert!(!key.matches(&EventKey::new("bridg", 1).to_bytes()));

        let mut longer = key.to_bytes();
        longer.push(0);
        assert!(!key.matches(&longer));
    }

    #[test]
    fn test_from_bytes_rejects_short() {
        assert!(EventKey::from_bytes(&[0, 0, 0, 1]).is_err());
        assert!(EventKey::from_bytes(&[0xff, 0, 0, 0, 1]).is_err());
    }

    proptest! {
        #[test]
        fn proptest_parse_inverts_encode(module in "[a-z]{1,12}", code in any::<u32>()) {
            let bytes = {
                let mut b = module.clone().into_bytes();
                b.extend_from_slice(&code.to_be_bytes());
                b
            };
            let key = EventKey::from_bytes(&bytes).unwrap();
            prop_assert_eq!(key.module(), module.as_str());
            prop_assert_eq!(key.code(), code);
            prop_assert!(key.matches(&bytes));
        }
    }
}
