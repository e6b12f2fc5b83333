//! Action filter expressions
//!
//! A filter gates a batch operation item by item. Its text has the form
//!
//! ```text
//! <command template> == <expected output>
//! <command template> != <expected output>
//! ```
//!
//! The operator must have whitespace on both sides. For every item the
//! template placeholders are substituted, the command runs through the shell
//! in the item's folder, and its trimmed stdout is compared with the expected
//! text.
//!
//! Placeholders:
//! - `$!` item name
//! - `$@` path of the folder holding the item
//!
//! Substituted values are shell-quoted.

use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::ShellConfig;
use crate::error::{FsError, FsResult};
use crate::files::item::Item;
use crate::shell::{capture_trimmed, quote_arg};

/// Replaced by the item name
pub const ITEM_NAME_TOKEN: &str = "$!";
/// Replaced by the folder containing the item
pub const FOLDER_PATH_TOKEN: &str = "$@";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterOperator {
    Equal,
    NotEqual,
}

impl FilterOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Equal => "==",
            FilterOperator::NotEqual => "!=",
        }
    }

    fn holds(self, actual: &str, expected: &str) -> bool {
        match self {
            FilterOperator::Equal => actual == expected,
            FilterOperator::NotEqual => actual != expected,
        }
    }
}

/// Parsed filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFilter {
    command_template: String,
    operator: FilterOperator,
    expected: String,
}

impl fmt::Display for ActionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.command_template,
            self.operator.symbol(),
            self.expected
        )
    }
}

impl ActionFilter {
    /// Parse filter text.
    ///
    /// Blank text means no filter and yields `Ok(None)`. Anything else must
    /// contain exactly one operator with a non-empty operand on each side.
    pub fn parse(raw: &str) -> FsResult<Option<ActionFilter>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let operators = find_operators(raw);
        let (index, operator) = match operators.as_slice() {
            [] => {
                return Err(FsError::incorrect_filter(
                    raw,
                    "expected '==' or '!=' surrounded by spaces",
                ))
            }
            [single] => *single,
            _ => {
                return Err(FsError::incorrect_filter(
                    raw,
                    "more than one comparison operator",
                ))
            }
        };

        let command_template = raw[..index].trim();
        let expected = raw[index + 2..].trim();
        if command_template.is_empty() {
            return Err(FsError::incorrect_filter(raw, "missing command before operator"));
        }
        if expected.is_empty() {
            return Err(FsError::incorrect_filter(raw, "missing expected value after operator"));
        }

        debug!(
            "Parsed action filter: command={:?} op={} expected={:?}",
            command_template,
            operator.symbol(),
            expected
        );

        Ok(Some(ActionFilter {
            command_template: command_template.to_string(),
            operator,
            expected: expected.to_string(),
        }))
    }

    pub fn command_template(&self) -> &str {
        &self.command_template
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Command line for one item. The template is scanned once, so
    /// substituted text is never searched for tokens again.
    pub fn substitute(&self, folder: &Path, name: &str) -> String {
        let mut command = String::with_capacity(self.command_template.len());
        let mut rest = self.command_template.as_str();

        while let Some(i) = rest.find('$') {
            command.push_str(&rest[..i]);
            let tail = &rest[i..];
            if let Some(after) = tail.strip_prefix(ITEM_NAME_TOKEN) {
                command.push_str(&quote_arg(name));
                rest = after;
            } else if let Some(after) = tail.strip_prefix(FOLDER_PATH_TOKEN) {
                command.push_str(&quote_arg(&folder.to_string_lossy()));
                rest = after;
            } else {
                command.push('$');
                rest = &tail[1..];
            }
        }
        command.push_str(rest);
        command
    }

    /// Run the check for `item`. Errors only when the shell cannot be started.
    pub fn check(&self, item: &Item, shell: &ShellConfig) -> FsResult<bool> {
        let folder = item
            .get_parent()
            .map(|p| p.get_path().to_path_buf())
            .unwrap_or_else(|| item.get_path().to_path_buf());
        let command = self.substitute(&folder, item.get_name());

        let output = capture_trimmed(shell, &command, &folder)?;
        let decision = self.operator.holds(&output, &self.expected);
        debug!(
            "Filter check for {:?}: {:?} -> {:?} ({})",
            item.get_path(),
            command,
            output,
            decision
        );
        Ok(decision)
    }

    /// Decision for `item`. A command that cannot be started counts as a
    /// rejection.
    pub fn evaluate(&self, item: &Item, shell: &ShellConfig) -> bool {
        self.check(item, shell).unwrap_or_else(|e| {
            warn!("Action filter could not run for {:?}: {}", item.get_path(), e);
            false
        })
    }
}

/// Byte offsets of every `==` / `!=` that has whitespace on both sides
fn find_operators(raw: &str) -> Vec<(usize, FilterOperator)> {
    let mut found = Vec::new();
    for (i, _) in raw.char_indices() {
        let rest = &raw[i..];
        let operator = if rest.starts_with("==") {
            FilterOperator::Equal
        } else if rest.starts_with("!=") {
            FilterOperator::NotEqual
        } else {
            continue;
        };

        let before = raw[..i].chars().next_back();
        let after = raw[i + 2..].chars().next();
        if before.is_some_and(char::is_whitespace) && after.is_some_and(char::is_whitespace) {
            found.push((i, operator));
        }
    }
    found
}
