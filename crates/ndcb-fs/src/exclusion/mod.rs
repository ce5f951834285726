//! Exclusion rules.
//!
//! A rule is a predicate over entries; rules compose by OR. Directory-scoped
//! rules come from rules files (`.gitignore`-style) read out of each
//! directory, and accumulate downward: an entry is checked against the rules
//! of every directory from the filesystem root to its parent.
//!
//! Exclusion is transitive. A directory excluded by an ancestor's rule hides
//! everything below it, whatever that subtree's own rules files say.

mod deep;
mod gitignore;
mod reader;
mod rule;

pub use deep::{children_rule, deep_exclusion_rule, is_excluded};
pub use gitignore::parse_gitignore;
pub use reader::{DirectoryRuleReader, RuleReaders, RulesFileReader, StaticRuleReader};
pub use rule::ExclusionRule;
