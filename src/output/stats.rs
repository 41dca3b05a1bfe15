//! Batch statistics over audit results
//!
//! Counts are derived from the results only, after the whole batch has
//! been audited.

use crate::audit::PageAuditResult;
use crate::links::{Presence, PAIR_SLOTS};

/// Counters for one audited batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStatistics {
    /// Number of audited rows
    pub total: usize,

    /// Final 200 with clean SEO and link checks
    pub checked_ok: usize,

    /// Final 200 but an SEO or link check reported an error
    pub check_errors: usize,

    /// Rows with an error that did not end in a 200
    pub request_errors: usize,

    /// Rows resolved with TLS verification disabled
    pub tls_fallbacks: usize,

    /// Rows ending in a status other than 0 or 200, without an error
    pub other_status: usize,

    /// Per-slot count of found URLs
    pub urls_found: [usize; PAIR_SLOTS],

    /// Per-slot count of matching anchors
    pub anchors_matched: [usize; PAIR_SLOTS],
}

impl BatchStatistics {
    /// Computes statistics for a batch of results
    pub fn from_results(results: &[PageAuditResult]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Self::default()
        };

        for result in results {
            let reachable = result.is_reachable();

            if reachable && !result.has_check_error() {
                stats.checked_ok += 1;
            }
            if reachable && result.has_check_error() {
                stats.check_errors += 1;
            }
            if result.error.is_some() && !reachable {
                stats.request_errors += 1;
            }
            if result.tls_fallback_used {
                stats.tls_fallbacks += 1;
            }
            if !matches!(result.final_status_code, 0 | 200) && result.error.is_none() {
                stats.other_status += 1;
            }

            for (slot, link) in result.links.iter().enumerate() {
                if link.found == Presence::Yes {
                    stats.urls_found[slot] += 1;
                }
                if link.anchor_matches == Presence::Yes {
                    stats.anchors_matched[slot] += 1;
                }
            }
        }

        stats
    }

    /// Share of rows fully checked, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.checked_ok as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &BatchStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Overview:");
    println!("  Pages audited: {}", stats.total);
    println!("  Reachable (200) and fully checked: {}", stats.checked_ok);
    println!("  Reachable (200) with SEO/link check errors: {}", stats.check_errors);
    println!("  Request errors: {}", stats.request_errors);
    println!("  TLS verification disabled: {}", stats.tls_fallbacks);
    println!("  Other final status codes: {}", stats.other_status);
    println!();

    println!("Links:");
    for slot in 0..PAIR_SLOTS {
        println!(
            "  URL {} found: {}, anchor {} matches: {}",
            slot + 1,
            stats.urls_found[slot],
            slot + 1,
            stats.anchors_matched[slot]
        );
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fully checked)",
        stats.success_rate(),
        stats.checked_ok,
        stats.total
    );
}
