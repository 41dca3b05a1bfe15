use crate::links::{AnchorCandidate, ExpectedLinkPair, PairMatchResult, Presence, PAIR_SLOTS};
use crate::normalize::{normalize_text, normalize_url};
use std::collections::BTreeSet;

/// A pair prepared for comparison
#[derive(Debug)]
struct Target {
    url: String,
    /// Normalized anchor text; empty means it can never match exactly
    anchor: String,
}

impl Target {
    fn from_pair(pair: &ExpectedLinkPair) -> Option<Self> {
        if !pair.is_checkable() {
            return None;
        }
        let url = normalize_url(pair.target_url.as_deref()?.trim());
        let anchor = pair
            .anchor_text
            .as_deref()
            .map(normalize_text)
            .unwrap_or_default();
        Some(Self { url, anchor })
    }
}

/// Per-slot state during the scan
#[derive(Debug)]
enum SlotState {
    /// No target URL; never evaluated
    Skipped,
    Searching {
        mismatch: Option<Mismatch>,
    },
    Exact {
        rel_attributes: Option<String>,
    },
}

/// First anchor with the right URL but the wrong text
#[derive(Debug)]
struct Mismatch {
    index: usize,
    rel_attributes: Option<String>,
}

/// Resolves the expected pairs against the page's anchors
///
/// Anchors are visited once in document order and, for each anchor, the
/// unresolved slots in slot order. An exact match is final for its slot and
/// consumes the anchor, so no later slot can claim it. A slot's first
/// same-URL/wrong-text anchor is kept as its mismatch candidate and dropped
/// after the scan if that anchor ended up consumed.
pub fn resolve_pairs(
    anchors: &[AnchorCandidate],
    pairs: &[ExpectedLinkPair; PAIR_SLOTS],
) -> [PairMatchResult; PAIR_SLOTS] {
    let targets: [Option<Target>; PAIR_SLOTS] =
        std::array::from_fn(|slot| Target::from_pair(&pairs[slot]));
    let mut states: [SlotState; PAIR_SLOTS] = std::array::from_fn(|slot| match targets[slot] {
        Some(_) => SlotState::Searching { mismatch: None },
        None => SlotState::Skipped,
    });
    let mut consumed = BTreeSet::new();

    for anchor in anchors {
        for (slot, target) in targets.iter().enumerate() {
            if let Some(target) = target {
                scan_anchor(slot, target, anchor, &mut states[slot], &mut consumed);
            }
        }
    }

    std::array::from_fn(|slot| match &states[slot] {
        SlotState::Skipped => PairMatchResult::default(),
        SlotState::Exact { rel_attributes } => PairMatchResult {
            found: Presence::Yes,
            anchor_matches: Presence::Yes,
            rel_attributes: rel_attributes.clone(),
        },
        SlotState::Searching {
            mismatch: Some(mismatch),
        } if !consumed.contains(&mismatch.index) => PairMatchResult {
            found: Presence::Yes,
            anchor_matches: Presence::No,
            rel_attributes: mismatch.rel_attributes.clone(),
        },
        SlotState::Searching { .. } => {
            tracing::debug!("Pair {} not found", slot + 1);
            PairMatchResult::not_found()
        }
    })
}

fn scan_anchor(
    slot: usize,
    target: &Target,
    anchor: &AnchorCandidate,
    state: &mut SlotState,
    consumed: &mut BTreeSet<usize>,
) {
    let SlotState::Searching { mismatch } = state else {
        return;
    };
    if anchor.normalized_href != target.url || consumed.contains(&anchor.index) {
        return;
    }

    if !target.anchor.is_empty() && anchor.normalized_text == target.anchor {
        tracing::info!(
            "Pair {}: found {} with matching anchor '{}'",
            slot + 1,
            anchor.raw_href,
            anchor.raw_text
        );
        consumed.insert(anchor.index);
        *state = SlotState::Exact {
            rel_attributes: anchor.rel_attributes(),
        };
    } else if mismatch.is_none() && !target.anchor.is_empty() {
        tracing::info!(
            "Pair {}: found {} but anchor '{}' differs from expected '{}'",
            slot + 1,
            anchor.raw_href,
            anchor.raw_text,
            target.anchor
        );
        *mismatch = Some(Mismatch {
            index: anchor.index,
            rel_attributes: anchor.rel_attributes(),
        });
    }
}
