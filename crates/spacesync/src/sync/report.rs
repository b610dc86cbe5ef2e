use std::fmt;
use std::sync::Mutex;

/// Verb printed for each applied or skipped change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeVerb {
    Created,
    Updated,
    /// Update where only the labels changed.
    Labels,
    Deleted,
    Skipped,
}

impl ChangeVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeVerb::Created => "Created",
            ChangeVerb::Updated => "Updated",
            ChangeVerb::Labels => "Labels ",
            ChangeVerb::Deleted => "Deleted",
            ChangeVerb::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for ChangeVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub verb: ChangeVerb,
    pub title: String,
    pub link: String,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.verb, self.link)
    }
}

/// Everything a sync run did, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub entries: Vec<ReportEntry>,
}

impl SyncReport {
    pub fn count(&self, verb: ChangeVerb) -> usize {
        self.entries.iter().filter(|e| e.verb == verb).count()
    }

    /// True when nothing was written remotely.
    pub fn is_unchanged(&self) -> bool {
        self.entries.iter().all(|e| e.verb == ChangeVerb::Skipped)
    }
}

pub trait ChangeReporter: Send + Sync {
    fn report(&self, entry: &ReportEntry);
}

/// Prints `"{verb}  {link}"` per change.
pub struct StdoutReporter;

impl ChangeReporter for StdoutReporter {
    fn report(&self, entry: &ReportEntry) {
        println!("{}", entry);
    }
}

/// No-op reporter for unit tests.
pub struct NoopReporter;

impl ChangeReporter for NoopReporter {
    fn report(&self, _entry: &ReportEntry) {}
}

/// Keeps every entry it receives.
#[derive(Default)]
pub struct CollectingReporter {
    entries: Mutex<Vec<ReportEntry>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ChangeReporter for CollectingReporter {
    fn report(&self, entry: &ReportEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_format() {
        let entry = ReportEntry {
            verb: ChangeVerb::Labels,
            title: "Intro".to_string(),
            link: "https://wiki/intro".to_string(),
        };
        assert_eq!(entry.to_string(), "Labels   https://wiki/intro");
    }

    #[test]
    fn test_report_counts() {
        let skipped = |title: &str| ReportEntry {
            verb: ChangeVerb::Skipped,
            title: title.to_string(),
            link: String::new(),
        };
        let mut report = SyncReport {
            entries: vec![skipped("a"), skipped("b")],
        };
        assert!(report.is_unchanged());

        report.entries.push(ReportEntry {
            verb: ChangeVerb::Created,
            ..skipped("c")
        });
        assert_eq!(report.count(ChangeVerb::Skipped), 2);
        assert!(!report.is_unchanged());
    }

    #[test]
    fn test_collecting_reporter() {
        let reporter = CollectingReporter::new();
        reporter.report(&ReportEntry {
            verb: ChangeVerb::Deleted,
            title: "Old".to_string(),
            link: "l".to_string(),
        });
        assert_eq!(reporter.entries().len(), 1);
    }
}
