//! `.gitignore`-syntax rules files, matched with the `ignore` crate.

use ignore::gitignore::GitignoreBuilder;

use super::ExclusionRule;
use crate::entry::File;
use crate::error::{FsError, Result};

/// Parse a rules file's contents into a rule scoped to its directory.
///
/// Lines are trimmed; blank lines and `#` comments are skipped; `!` negates;
/// a trailing `/` matches directories only; a leading or inner `/` anchors
/// the pattern to the rules file's directory.
///
/// The resulting rule only considers entries strictly inside the rules
/// file's directory, and never excludes the rules file itself.
pub fn parse_gitignore(file: &File, contents: &str) -> Result<ExclusionRule> {
    let scope = file.directory().into_path();
    let mut builder = GitignoreBuilder::new(scope.as_path());

    for line in contents.lines() {
        builder
            .add_line(Some(file.path().as_path().to_path_buf()), line.trim())
            .map_err(|err| FsError::RulesParse {
                file: file.path().clone(),
                message: err.to_string(),
            })?;
    }

    let matcher = builder.build().map_err(|err| FsError::RulesParse {
        file: file.path().clone(),
        message: err.to_string(),
    })?;
    if matcher.is_empty() {
        return Ok(ExclusionRule::never());
    }

    let own = file.path().clone();
    Ok(ExclusionRule::new(move |entry| {
        let path = entry.path();
        if *path == own || *path == scope || !path.is_within(&scope) {
            return false;
        }
        matcher
            .matched(path.as_path(), entry.is_directory())
            .is_ignore()
    }))
}
