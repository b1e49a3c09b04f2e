//! Rule deduplication pass
//!
//! One forward traversal over the lines of a filter list:
//! - Non-rule lines (comments, headers, blanks) are always retained
//! - The first occurrence of every `||...^` rule is retained
//! - Later occurrences of the exact same rule text are dropped and reported
//!   to a [`DuplicateObserver`]
//!
//! Matching is exact-string. `||Ads.example.com^` and `||ads.example.com^`
//! are two different rules.

use crate::rule::{classify, strip_terminator, LineKind};
use ahash::RandomState;
use hashbrown::HashSet;

/// Set of rule texts seen so far in one pass
#[derive(Debug, Clone)]
pub struct RuleSet {
    set: HashSet<String, RandomState>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            set: HashSet::with_hasher(RandomState::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            set: HashSet::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Record a rule. Returns true if it had not been seen before.
    pub fn insert(&mut self, rule: &str) -> bool {
        if self.set.contains(rule) {
            return false;
        }
        self.set.insert(rule.to_string())
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.set.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        let text: usize = self.set.iter().map(String::capacity).sum();
        text + self.set.capacity() * std::mem::size_of::<String>()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives every rule dropped as a duplicate
///
/// Purely observational: nothing an observer does can change what the pass
/// retains or counts.
pub trait DuplicateObserver {
    /// `line_number` is 1-based and refers to the dropped occurrence
    fn on_duplicate(&mut self, line_number: usize, rule: &str);
}

impl<F> DuplicateObserver for F
where
    F: FnMut(usize, &str),
{
    fn on_duplicate(&mut self, line_number: usize, rule: &str) {
        self(line_number, rule)
    }
}

/// Observer that ignores duplicates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DuplicateObserver for NoopObserver {
    fn on_duplicate(&mut self, _line_number: usize, _rule: &str) {}
}

/// Counters for one pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupStats {
    /// Lines read, rules and non-rules alike
    pub total_lines: u64,
    /// Lines classified as rules
    pub rule_lines: u64,
    /// Lines passed through without deduplication
    pub non_rule_lines: u64,
    /// Distinct rule texts retained
    pub unique_rules: u64,
    /// Rule lines dropped because their text was already retained
    pub duplicates_removed: u64,
}

impl DedupStats {
    /// Lines that end up in the output
    pub fn retained_lines(&self) -> u64 {
        self.total_lines - self.duplicates_removed
    }

    /// Every rule line is either unique or a removed duplicate
    pub fn is_consistent(&self) -> bool {
        self.unique_rules + self.duplicates_removed == self.rule_lines
            && self.rule_lines + self.non_rule_lines == self.total_lines
    }
}

/// Streaming form of the pass
///
/// Feed lines in input order with [`push`](Self::push); the returned text is
/// what belongs in the output at that position.
pub struct Deduplicator<O = NoopObserver> {
    seen: RuleSet,
    stats: DedupStats,
    observer: O,
}

impl Deduplicator<NoopObserver> {
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for Deduplicator<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: DuplicateObserver> Deduplicator<O> {
    pub fn with_observer(observer: O) -> Self {
        Self::with_capacity(0, observer)
    }

    pub fn with_capacity(capacity: usize, observer: O) -> Self {
        Self {
            seen: RuleSet::with_capacity(capacity),
            stats: DedupStats::default(),
            observer,
        }
    }

    /// Process the next line.
    ///
    /// Returns the line without its terminator if it is retained, `None` if
    /// it is a duplicate rule.
    pub fn push<'a>(&mut self, line: &'a str) -> Option<&'a str> {
        let line = strip_terminator(line);
        self.stats.total_lines += 1;

        match classify(line) {
            LineKind::Other => {
                self.stats.non_rule_lines += 1;
                Some(line)
            }
            LineKind::Rule => {
                self.stats.rule_lines += 1;
                if self.seen.insert(line) {
                    Some(line)
                } else {
                    self.stats.duplicates_removed += 1;
                    let line_number = self.stats.total_lines as usize;
                    self.observer.on_duplicate(line_number, line);
                    None
                }
            }
        }
    }

    /// Counters so far
    pub fn stats(&self) -> DedupStats {
        DedupStats {
            unique_rules: self.seen.len() as u64,
            ..self.stats
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.seen
    }

    /// End the pass. The seen-rules set is dropped here.
    pub fn finish(self) -> DedupStats {
        self.stats()
    }
}

/// Result of a complete in-memory pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    /// Retained lines in input order, terminators stripped
    pub retained: Vec<String>,
    pub stats: DedupStats,
}

impl DedupOutcome {
    pub fn unique_count(&self) -> u64 {
        self.stats.unique_rules
    }

    pub fn removed_count(&self) -> u64 {
        self.stats.duplicates_removed
    }

    /// Output text, each retained line followed by a single `\n`
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.retained.iter().map(|l| l.len() + 1).sum());
        for line in &self.retained {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Run the pass over a complete line sequence
pub fn deduplicate<I, S, O>(lines: I, observer: O) -> DedupOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    O: DuplicateObserver,
{
    let lines = lines.into_iter();
    let mut dedup = Deduplicator::with_capacity(lines.size_hint().0, observer);
    let mut retained = Vec::with_capacity(lines.size_hint().0);

    for line in lines {
        if let Some(kept) = dedup.push(line.as_ref()) {
            retained.push(kept.to_string());
        }
    }

    DedupOutcome {
        retained,
        stats: dedup.finish(),
    }
}
