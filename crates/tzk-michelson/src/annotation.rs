// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Annotation lookup on schema nodes.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// `:name`
    Type,
    /// `@name`
    Variable,
    /// `%name`
    Field,
}

/// Lookup order used by most call sites.
pub const TYPE_THEN_FIELD: &[AnnotationKind] = &[AnnotationKind::Type, AnnotationKind::Field];

impl AnnotationKind {
    pub fn prefix(self) -> char {
        match self {
            AnnotationKind::Type => ':',
            AnnotationKind::Variable => '@',
            AnnotationKind::Field => '%',
        }
    }

    pub fn of(annotation: &str) -> Option<Self> {
        match annotation.chars().next()? {
            ':' => Some(AnnotationKind::Type),
            '@' => Some(AnnotationKind::Variable),
            '%' => Some(AnnotationKind::Field),
            _ => None,
        }
    }
}

/// First annotation matching `kinds` (tried in order), without its prefix.
pub fn find_annotation<'a>(annots: &'a [String], kinds: &[AnnotationKind]) -> Option<&'a str> {
    kinds.iter().find_map(|kind| {
        annots
            .iter()
            .filter_map(|annot| annot.strip_prefix(kind.prefix()))
            .find(|name| !name.is_empty())
    })
}
