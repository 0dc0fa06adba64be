// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Micheline wire tree.
//!
//! The JSON shape nodes exchange both types (schemas) and data with:
//!
//! ```text
//! { "int": "42" }   { "string": "tz1…" }   { "bytes": "0a0b" }
//! { "prim": "Pair", "args": [ … ], "annots": [ "%from" ] }
//! [ node, node, … ]                       (sequence)
//! ```
//!
//! [`Display`](std::fmt::Display) renders the human-readable Michelson
//! notation, e.g. `Pair "tz1…" 5`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Micheline {
    Int {
        int: String,
    },
    String {
        string: String,
    },
    Bytes {
        bytes: String,
    },
    Prim {
        prim: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Micheline>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        annots: Vec<String>,
    },
    Seq(Vec<Micheline>),
}

impl Micheline {
    pub fn int(value: impl fmt::Display) -> Self {
        Micheline::Int {
            int: value.to_string(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Micheline::String {
            string: value.into(),
        }
    }

    pub fn bytes(value: &[u8]) -> Self {
        Micheline::Bytes {
            bytes: hex::encode(value),
        }
    }

    pub fn prim(prim: impl Into<String>, args: Vec<Micheline>) -> Self {
        Micheline::Prim {
            prim: prim.into(),
            args,
            annots: Vec::new(),
        }
    }

    pub fn prim_with_annots(
        prim: impl Into<String>,
        args: Vec<Micheline>,
        annots: Vec<String>,
    ) -> Self {
        Micheline::Prim {
            prim: prim.into(),
            args,
            annots,
        }
    }

    /// `(prim, args, annots)` when this node is a primitive application.
    pub fn as_prim(&self) -> Option<(&str, &[Micheline], &[String])> {
        match self {
            Micheline::Prim { prim, args, annots } => Some((prim, args, annots)),
            _ => None,
        }
    }

    pub fn is_prim(&self, name: &str) -> bool {
        matches!(self, Micheline::Prim { prim, .. } if prim == name)
    }

    pub fn from_json(value: &Value) -> Option<Micheline> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_json(&self) -> Value {
        match self {
            Micheline::Int { int } => json!({ "int": int }),
            Micheline::String { string } => json!({ "string": string }),
            Micheline::Bytes { bytes } => json!({ "bytes": bytes }),
            Micheline::Prim { prim, args, annots } => {
                let mut node = serde_json::Map::new();
                node.insert("prim".into(), Value::String(prim.clone()));
                if !args.is_empty() {
                    node.insert(
                        "args".into(),
                        Value::Array(args.iter().map(Micheline::to_json).collect()),
                    );
                }
                if !annots.is_empty() {
                    node.insert(
                        "annots".into(),
                        Value::Array(annots.iter().cloned().map(Value::String).collect()),
                    );
                }
                Value::Object(node)
            }
            Micheline::Seq(items) => Value::Array(items.iter().map(Micheline::to_json).collect()),
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Micheline::Int { int } => f.write_str(int),
            Micheline::String { string } => write!(f, "{}", Value::String(string.clone())),
            Micheline::Bytes { bytes } => write!(f, "0x{bytes}"),
            Micheline::Prim { prim, args, annots } => {
                let bare = args.is_empty() && annots.is_empty();
                if nested && !bare {
                    f.write_str("(")?;
                }
                f.write_str(prim)?;
                for annot in annots {
                    write!(f, " {annot}")?;
                }
                for arg in args {
                    f.write_str(" ")?;
                    arg.write(f, true)?;
                }
                if nested && !bare {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Micheline::Seq(items) => {
                if items.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ; ")?;
                    }
                    item.write(f, false)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl fmt::Display for Micheline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, false)
    }
}

impl From<Micheline> for Value {
    fn from(node: Micheline) -> Self {
        node.to_json()
    }
}
