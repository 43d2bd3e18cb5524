/// Implements the common conversions, hex formatting and serde support for a
/// newtype wrapping a fixed-size byte array.
///
/// The wrapper must be a tuple struct over `[u8; $len]`. Serde always uses the hex string
/// form; binary encodings go through borsh, which callers derive themselves.
#[macro_export]
macro_rules! impl_fixed_bytes {
    ($wrapper:ident, $len:expr) => {
        impl $wrapper {
            /// Length of the underlying byte array.
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Builds the wrapper from a slice, returning `None` on a length mismatch.
            pub fn from_slice(data: &[u8]) -> ::std::option::Option<Self> {
                <[u8; $len]>::try_from(data).ok().map(Self)
            }
        }

        impl ::std::convert::From<[u8; $len]> for $wrapper {
            fn from(value: [u8; $len]) -> Self {
                Self(value)
            }
        }

        impl ::std::convert::From<$wrapper> for [u8; $len] {
            fn from(value: $wrapper) -> Self {
                value.0
            }
        }

        impl ::std::convert::AsRef<[u8]> for $wrapper {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::core::fmt::Debug for $wrapper {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(
                    f,
                    "{}({})",
                    stringify!($wrapper),
                    $crate::utils::encode_hex(&self.0)
                )
            }
        }

        impl ::core::fmt::Display for $wrapper {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&$crate::utils::encode_hex(&self.0))
            }
        }

        impl ::std::str::FromStr for $wrapper {
            type Err = $crate::utils::HexError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::utils::decode_hex_array::<$len>(s).map(Self)
            }
        }

        impl ::serde::Serialize for $wrapper {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(&$crate::utils::encode_hex(&self.0))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let s = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}
