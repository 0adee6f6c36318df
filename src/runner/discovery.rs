use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::testing::Harness;

use super::loader::ModuleLoader;
use super::suite::TestEntry;

/// Case-insensitive filter over test names and file identifiers.
/// An empty pattern matches everything.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Whether an entry is selected: either its name or its file matches.
    pub fn selects(&self, file: &str, name: &str) -> bool {
        self.matches(name) || self.matches(file)
    }
}

/// The selected entries, in file order then declaration order.
#[derive(Debug)]
pub struct Discovery {
    pub entries: Vec<TestEntry>,
    pub file_count: usize,
}

impl Discovery {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn banner(&self) -> String {
        format!(
            "{} test cases discovered, in {} files.",
            self.count(),
            self.file_count
        )
    }
}

/// Loads every file and keeps the tests `matcher` selects.
///
/// A module that fails to load aborts discovery.
pub fn discover(
    files: &[String],
    loader: &dyn ModuleLoader,
    harness: &Harness,
    matcher: &Matcher,
) -> Result<Discovery> {
    let mut entries = Vec::new();

    for file in files {
        let suite = loader.load(file, harness)?;
        let exported = suite.len();
        for (name, test) in suite {
            if !matcher.selects(file, &name) {
                continue;
            }
            entries.push(TestEntry::new(file.clone(), name, test));
        }
        debug!(file = %file, exported, "loaded test module");
    }

    Ok(Discovery {
        entries,
        file_count: files.len(),
    })
}
