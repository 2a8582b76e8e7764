//! Interactive replacement of placeholder passwords inside a credential tree.
//!
//! The tree is walked depth-first in document order. Objects are descended
//! key by key; arrays are descended element by element when the element is an
//! object. A string entry whose key ends in "password" is replaced when its
//! value equals the placeholder, or unconditionally when the placeholder is
//! the `*` wildcard.

use std::fmt;

use serde_json::{Map, Value};
use tracing::{debug, info};

use super::credentials::{display_value, is_password_key};
use super::types::PLACEHOLDER;
use crate::errors::{OpsError, RetryPolicy};
use crate::prompt::{prompt_confirmed_secret, Prompter};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a field inside the tree, rendered as `Host.SSH[0].password`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath(Vec<Segment>);

impl TreePath {
    fn push_key(&mut self, key: &str) {
        self.0.push(Segment::Key(key.to_string()));
    }

    fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }

    fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

struct Walk<'a> {
    placeholder: &'a str,
    retry: &'a RetryPolicy,
    replaced: usize,
}

/// Replace every matching password in `tree`, prompting the operator for each
/// one. Returns how many fields were replaced.
pub fn replace_passwords(
    tree: &mut Value,
    placeholder: &str,
    prompter: &mut dyn Prompter,
    retry: &RetryPolicy,
) -> Result<usize, OpsError> {
    let mut walk = Walk { placeholder, retry, replaced: 0 };
    let mut path = TreePath::default();
    walk.visit(tree, &mut path, prompter)?;
    info!(replaced = walk.replaced, "Password replacement finished");
    Ok(walk.replaced)
}

impl Walk<'_> {
    fn visit(&mut self, value: &mut Value, path: &mut TreePath, prompter: &mut dyn Prompter) -> Result<(), OpsError> {
        match value {
            Value::Object(map) => self.visit_object(map, path, prompter),
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    if item.is_object() {
                        path.push_index(index);
                        self.visit(item, path, prompter)?;
                        path.pop();
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn visit_object(
        &mut self,
        map: &mut Map<String, Value>,
        path: &mut TreePath,
        prompter: &mut dyn Prompter,
    ) -> Result<(), OpsError> {
        let keys: Vec<String> = map.keys().cloned().collect();

        for key in keys {
            path.push_key(&key);

            let is_target = matches!(
                map.get(&key),
                Some(Value::String(current)) if is_password_key(&key) && self.matches(current)
            );

            if is_target {
                debug!(path = %path, "Replacing password");
                let secret = ask_for_password(map, path, prompter, self.retry)?;
                map.insert(key.clone(), Value::String(secret));
                self.replaced += 1;
            } else if let Some(child) = map.get_mut(&key) {
                if child.is_object() || child.is_array() {
                    self.visit(child, path, prompter)?;
                }
            }

            path.pop();
        }
        Ok(())
    }

    fn matches(&self, current: &str) -> bool {
        self.placeholder == PLACEHOLDER || current == self.placeholder
    }
}

/// Show the entry being changed (password values masked) and read the new
/// secret with confirmation.
fn ask_for_password(
    entry: &Map<String, Value>,
    path: &TreePath,
    prompter: &mut dyn Prompter,
    retry: &RetryPolicy,
) -> Result<String, OpsError> {
    prompter.say("Update Password Configuration:");
    prompter.say(&format!("{} = {{", path));
    for (key, value) in entry {
        if let Value::String(text) = value {
            prompter.say(&format!("  {}: {}", key, display_value(key, text)));
        }
    }
    prompter.say("}");

    let prompt = match entry.get("username").and_then(Value::as_str) {
        Some(user) if !user.is_empty() => format!("New Password for \"{}\": ", user),
        _ => "New Password: ".to_string(),
    };
    prompt_confirmed_secret(prompter, &prompt, "Confirm Password: ", retry)
}
