//! Named answers to the interactive prompts of GROMACS tools.
//!
//! GROMACS asks for index groups (and, for `gmx energy`, energy terms) on
//! standard input. Instead of piping bare positional numbers, every answer
//! is a named entry so a step's intent is visible in logs and config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An index group, given either by its position in the index file or by
/// its name (GROMACS accepts both at the prompt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupSelection {
    Index(u32),
    Name(String),
}

impl GroupSelection {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl fmt::Display for GroupSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{}", i),
            Self::Name(n) => f.write_str(n),
        }
    }
}

impl FromStr for GroupSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u32>() {
            Ok(i) => Self::Index(i),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEntry {
    pub field: &'static str,
    pub value: String,
}

/// Ordered prompt answers fed to a tool's standard input, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    entries: Vec<ScriptedEntry>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, value: impl ToString) -> Self {
        self.entries.push(ScriptedEntry {
            field,
            value: value.to_string(),
        });
        self
    }

    pub fn entries(&self) -> &[ScriptedEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_stdin(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.value);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for ScriptedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", entry.field, entry.value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_selection_parses_index_or_name() {
        assert_eq!("4".parse::<GroupSelection>().unwrap(), GroupSelection::Index(4));
        assert_eq!(
            " C-alpha ".parse::<GroupSelection>().unwrap(),
            GroupSelection::name("C-alpha")
        );
    }

    #[test]
    fn stdin_has_one_line_per_entry_in_order() {
        let input = ScriptedInput::new()
            .with("fit", GroupSelection::name("Backbone"))
            .with("output", GroupSelection::Index(1));
        assert_eq!(input.to_stdin(), "Backbone\n1\n");
        assert_eq!(input.to_string(), "fit=Backbone, output=1");
    }

    #[test]
    fn empty_input_renders_nothing() {
        let input = ScriptedInput::new();
        assert!(input.is_empty());
        assert_eq!(input.to_stdin(), "");
    }
}
