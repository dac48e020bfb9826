//! Diff calculation between the live archive index and the known-weeks
//! ledger.
//!
//! Only the two most recent completed compilations are considered; if both
//! match the ledger's last two labels, the run is a clean no-op.

use crate::models::{ArchiveEntry, KnownWeeksLedger};

/// Result of diffing the live archive against the ledger.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Unseen entries, oldest-missing-first (processing order).
    pub unseen: Vec<ArchiveEntry>,
}

impl DiffResult {
    /// True if both live entries were already recorded: nothing to harvest.
    pub fn is_noop(&self) -> bool {
        self.unseen.is_empty()
    }
}

/// Decide which of the two live entries are unseen.
///
/// `live` is ordered newest-first: `live[0]` is the previous-to-latest
/// compilation, `live[1]` the one before it. An entry is unseen when its
/// label differs from the ledger's most recent label. Output is reversed to
/// chronological order so downstream ids stay monotonic.
pub fn diff_against_ledger(live: &[ArchiveEntry], ledger: &KnownWeeksLedger) -> DiffResult {
    let (Some(previous_to_latest), Some(previous_to_previous)) = (live.first(), live.get(1))
    else {
        return DiffResult::default();
    };

    let last_known = ledger.last_known();
    let second_to_last_known = ledger.second_to_last_known();

    if Some(previous_to_latest.week_label.as_str()) == last_known
        && Some(previous_to_previous.week_label.as_str()) == second_to_last_known
    {
        return DiffResult::default();
    }

    let mut unseen = Vec::new();
    // Oldest first, so the later week's records get the later ids.
    if Some(previous_to_previous.week_label.as_str()) != last_known {
        unseen.push(previous_to_previous.clone());
    }
    if Some(previous_to_latest.week_label.as_str()) != last_known {
        unseen.push(previous_to_latest.clone());
    }

    DiffResult { unseen }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str) -> ArchiveEntry {
        ArchiveEntry {
            week_label: label.to_string(),
            url: format!("https://archive.example/{label}"),
        }
    }

    fn ledger(labels: &[&str]) -> KnownWeeksLedger {
        KnownWeeksLedger::from_labels(labels.iter().copied())
    }

    #[test]
    fn test_noop_when_both_known() {
        let live = [entry("W3"), entry("W2")];
        let result = diff_against_ledger(&live, &ledger(&["W1", "W2", "W3"]));
        assert!(result.is_noop());
    }

    #[test]
    fn test_one_week_behind() {
        // Ledger stops at W2; only W3 is new.
        let live = [entry("W3"), entry("W2")];
        let result = diff_against_ledger(&live, &ledger(&["W1", "W2"]));
        assert_eq!(result.unseen, vec![entry("W3")]);
    }

    #[test]
    fn test_two_weeks_behind_oldest_first() {
        let live = [entry("W4"), entry("W3")];
        let result = diff_against_ledger(&live, &ledger(&["W1", "W2"]));
        assert_eq!(result.unseen, vec![entry("W3"), entry("W4")]);
    }

    #[test]
    fn test_empty_ledger_takes_both() {
        let live = [entry("W4"), entry("W3")];
        let result = diff_against_ledger(&live, &KnownWeeksLedger::default());
        assert_eq!(result.unseen, vec![entry("W3"), entry("W4")]);
    }

    #[test]
    fn test_short_live_slice_is_noop() {
        let result = diff_against_ledger(&[entry("W3")], &ledger(&["W1"]));
        assert!(result.is_noop());
    }
}
