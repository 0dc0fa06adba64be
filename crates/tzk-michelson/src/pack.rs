// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Binary packing of typed values and script-expression hashes.
//!
//! | Variant | Encoding |
//! |---|---|
//! | String | `0x01` + u32 BE length + UTF-8 bytes |
//! | Bytes | `0x0A` + u32 BE length + bytes |
//! | Pair | `0x07` + first + second |
//! | List / Set | `0x02` + u32 BE byte length + concatenated elements |
//! | Address | as String (`tz1…`) or Bytes (binary form) |
//!
//! Every other variant is [`MichelsonError::Unsupported`].

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use crate::error::{MichelsonError, MichelsonResult};
use crate::value::{force, Address, TypedValue, ValueKind};

type Blake2b256 = Blake2b<U32>;

const STRING_TAG: u8 = 0x01;
const SEQUENCE_TAG: u8 = 0x02;
const PAIR_TAG: u8 = 0x07;
const BYTES_TAG: u8 = 0x0A;

/// Leading byte of a packed value.
pub const PACK_PREFIX: u8 = 0x05;

/// Base58 version bytes that make an encoded hash start with `expr`.
const EXPR_PREFIX: [u8; 4] = [13, 44, 64, 27];

impl TypedValue {
    /// Packed encoding without the `0x05` prefix.
    pub fn encode(&self) -> MichelsonResult<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// `0x05` followed by [`encode`](Self::encode).
    pub fn pack(&self) -> MichelsonResult<Vec<u8>> {
        let mut out = vec![PACK_PREFIX];
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// `expr…` hash of the packed value, as used for big-map keys.
    pub fn script_expr_hash(&self) -> MichelsonResult<String> {
        Ok(script_expr_hash(&self.pack()?))
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> MichelsonResult<()> {
        match self.kind() {
            ValueKind::String(s) | ValueKind::Address(Address::Encoded(s)) => {
                length_prefixed(out, STRING_TAG, s.as_bytes())
            }
            ValueKind::Bytes(bytes) | ValueKind::Address(Address::Raw(bytes)) => {
                length_prefixed(out, BYTES_TAG, bytes)
            }
            ValueKind::Pair(first, second) => {
                out.push(PAIR_TAG);
                force(first)?.encode_into(out)?;
                force(second)?.encode_into(out)
            }
            ValueKind::List(items) => {
                let mut body = Vec::new();
                for item in items {
                    force(item)?.encode_into(&mut body)?;
                }
                length_prefixed(out, SEQUENCE_TAG, &body)
            }
            _ => Err(MichelsonError::Unsupported(format!(
                "packing {} values",
                self.variant_name()
            ))),
        }
    }
}

fn length_prefixed(out: &mut Vec<u8>, tag: u8, body: &[u8]) -> MichelsonResult<()> {
    let len = u32::try_from(body.len()).map_err(|_| {
        MichelsonError::InvalidValue(format!("pack: {} bytes exceed u32 length", body.len()))
    })?;
    out.push(tag);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(body);
    Ok(())
}

/// Blake2b-256 of already packed bytes, base58check-encoded with the
/// `expr` prefix.
pub fn script_expr_hash(packed: &[u8]) -> String {
    let digest = Blake2b256::digest(packed);
    let mut payload = Vec::with_capacity(EXPR_PREFIX.len() + digest.len());
    payload.extend_from_slice(&EXPR_PREFIX);
    payload.extend_from_slice(&digest);
    bs58::encode(payload).with_check().into_string()
}
