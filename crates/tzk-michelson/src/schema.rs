// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Schema trees parsed from Micheline type nodes.
//!
//! A [`SchemaMeta`] is built once per contract entrypoint (or storage
//! section) and reused for every value read or written against it.
//! Type arguments are parsed on first use.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::annotation::{find_annotation, AnnotationKind};
use crate::error::{MichelsonError, MichelsonResult};
use crate::lazy::Lazy;
use crate::micheline::Micheline;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Nat,
    Int,
    String,
    Bytes,
    Mutez,
    Bool,
    KeyHash,
    Timestamp,
    Address,
    Key,
    Unit,
    Signature,
    Option,
    List,
    Set,
    Operation,
    Contract,
    Pair,
    Or,
    Lambda,
    Map,
    BigMap,
    ChainId,
    SaplingTransaction,
    /// Any other primitive (`ticket`, `never`, `bls12_381_fr`, ...). Parses,
    /// but values of it cannot be built.
    Other(String),
}

impl TypeTag {
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::Nat => "nat",
            TypeTag::Int => "int",
            TypeTag::String => "string",
            TypeTag::Bytes => "bytes",
            TypeTag::Mutez => "mutez",
            TypeTag::Bool => "bool",
            TypeTag::KeyHash => "key_hash",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Address => "address",
            TypeTag::Key => "key",
            TypeTag::Unit => "unit",
            TypeTag::Signature => "signature",
            TypeTag::Option => "option",
            TypeTag::List => "list",
            TypeTag::Set => "set",
            TypeTag::Operation => "operation",
            TypeTag::Contract => "contract",
            TypeTag::Pair => "pair",
            TypeTag::Or => "or",
            TypeTag::Lambda => "lambda",
            TypeTag::Map => "map",
            TypeTag::BigMap => "big_map",
            TypeTag::ChainId => "chain_id",
            TypeTag::SaplingTransaction => "sapling_transaction",
            TypeTag::Other(name) => name,
        }
    }
}

impl FromStr for TypeTag {
    type Err = MichelsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s {
            "nat" => TypeTag::Nat,
            "int" => TypeTag::Int,
            "string" => TypeTag::String,
            "bytes" => TypeTag::Bytes,
            "mutez" => TypeTag::Mutez,
            "bool" => TypeTag::Bool,
            "key_hash" => TypeTag::KeyHash,
            "timestamp" => TypeTag::Timestamp,
            "address" => TypeTag::Address,
            "key" => TypeTag::Key,
            "unit" => TypeTag::Unit,
            "signature" => TypeTag::Signature,
            "option" => TypeTag::Option,
            "list" => TypeTag::List,
            "set" => TypeTag::Set,
            "operation" => TypeTag::Operation,
            "contract" => TypeTag::Contract,
            "pair" => TypeTag::Pair,
            "or" => TypeTag::Or,
            "lambda" => TypeTag::Lambda,
            "map" => TypeTag::Map,
            "big_map" => TypeTag::BigMap,
            "chain_id" => TypeTag::ChainId,
            "sapling_transaction" => TypeTag::SaplingTransaction,
            "" => return Err(MichelsonError::InvalidValue("empty type tag".into())),
            other => TypeTag::Other(other.to_string()),
        };
        Ok(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deferred schema for one structural type argument.
pub type Generic = Arc<Lazy<MichelsonResult<SchemaMeta>>>;

#[derive(Debug, Clone)]
pub struct SchemaMeta {
    tag: TypeTag,
    annots: Vec<String>,
    generics: Vec<Generic>,
}

impl SchemaMeta {
    pub fn leaf(tag: TypeTag, annots: Vec<String>) -> Self {
        Self {
            tag,
            annots,
            generics: Vec::new(),
        }
    }

    pub fn generic(tag: TypeTag, annots: Vec<String>, generics: Vec<SchemaMeta>) -> Self {
        Self {
            tag,
            annots,
            generics: generics
                .into_iter()
                .map(|meta| Arc::new(Lazy::ready(Ok(meta))))
                .collect(),
        }
    }

    /// Parse a schema from a type node.
    ///
    /// Primitives outside the known vocabulary parse as [`TypeTag::Other`].
    /// Returns `Ok(None)` when `node` is not a primitive application.
    /// Arguments that are not primitive applications (inline literals such
    /// as a sapling memo size) are not type arguments and are dropped.
    pub fn from_micheline(node: &Micheline) -> MichelsonResult<Option<SchemaMeta>> {
        let Some((prim, args, annots)) = node.as_prim() else {
            return Ok(None);
        };
        let tag: TypeTag = prim.parse()?;

        let structural: Vec<&Micheline> =
            args.iter().filter(|arg| arg.as_prim().is_some()).collect();

        let generics = if tag == TypeTag::Pair && structural.len() > 2 {
            // pair a b c == pair a (pair b c)
            let rest = Micheline::prim(
                TypeTag::Pair.as_str(),
                structural[1..].iter().map(|n| (*n).clone()).collect(),
            );
            vec![deferred(structural[0].clone()), deferred(rest)]
        } else {
            structural.into_iter().cloned().map(deferred).collect()
        };

        Ok(Some(SchemaMeta {
            tag,
            annots: annots.to_vec(),
            generics,
        }))
    }

    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn annots(&self) -> &[String] {
        &self.annots
    }

    pub fn generics(&self) -> &[Generic] {
        &self.generics
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    /// Schema of the `index`-th type argument, parsing it on first access.
    pub fn argument(&self, index: usize) -> MichelsonResult<&SchemaMeta> {
        let generic = self.generics.get(index).ok_or_else(|| {
            MichelsonError::InvalidValue(format!(
                "{} schema has no type argument {index}",
                self.tag
            ))
        })?;
        generic.get().as_ref().map_err(Clone::clone)
    }

    pub fn annotation(&self, kinds: &[AnnotationKind]) -> Option<&str> {
        find_annotation(&self.annots, kinds)
    }

    pub fn field_annotation(&self) -> Option<&str> {
        self.annotation(&[AnnotationKind::Field])
    }

    /// Re-serialize as a type node. Forces every type argument.
    pub fn to_micheline(&self) -> MichelsonResult<Micheline> {
        let args = (0..self.generics.len())
            .map(|i| self.argument(i)?.to_micheline())
            .collect::<MichelsonResult<Vec<_>>>()?;
        Ok(Micheline::prim_with_annots(
            self.tag.as_str(),
            args,
            self.annots.clone(),
        ))
    }
}

fn deferred(node: Micheline) -> Generic {
    Arc::new(Lazy::new(move || {
        SchemaMeta::from_micheline(&node)?.ok_or_else(|| {
            MichelsonError::InvalidValue("type argument is not a primitive application".into())
        })
    }))
}
