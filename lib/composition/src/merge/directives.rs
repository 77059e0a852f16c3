use std::collections::HashSet;

use crate::schema::{Deprecation, MemberDirectives};

pub(super) fn merge_member_directives(
    target: &mut MemberDirectives,
    source: &MemberDirectives,
    repeatable: &HashSet<&str>,
) {
    target.inaccessible |= source.inaccessible;

    for tag in &source.tags {
        if !target.tags.contains(tag) {
            target.tags.push(tag.clone());
        }
    }

    for key in &source.keys {
        if !target.keys.iter().any(|existing| existing.fields == key.fields) {
            target.keys.push(key.clone());
        }
    }

    for source_directive in &source.sources {
        if !target.sources.contains(source_directive) {
            target.sources.push(source_directive.clone());
        }
    }

    if target.requires.is_none() {
        target.requires = source.requires.clone();
    }
    if target.is.is_none() {
        target.is = source.is.clone();
    }

    for directive in &source.other {
        let keep = if repeatable.contains(directive.name.as_str()) {
            !target.other.contains(directive)
        } else {
            !target.other.iter().any(|existing| existing.name == directive.name)
        };
        if keep {
            target.other.push(directive.clone());
        }
    }
}

/// First non-empty description wins.
pub(super) fn merge_description(target: &mut Option<String>, source: &Option<String>) {
    if target.as_deref().is_some_and(|description| !description.is_empty()) {
        return;
    }
    if let Some(description) = source.as_ref().filter(|description| !description.is_empty()) {
        *target = Some(description.clone());
    }
}

/// A member is deprecated as soon as one source deprecates it; the first reason given wins.
pub(super) fn merge_deprecation(target: &mut Option<Deprecation>, source: &Option<Deprecation>) {
    let Some(source) = source else {
        return;
    };
    if let Some(existing) = target {
        if existing.reason.is_none() {
            existing.reason = source.reason.clone();
        }
    } else {
        *target = Some(source.clone());
    }
}
