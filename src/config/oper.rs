//! Operator classes and operator blocks.
//!
//! Oper classes are named capability bundles that may `extends` one other
//! class. Resolution flattens every class so that it carries the union of
//! its own capabilities and those of all its ancestors. Operators are then
//! bound to their resolved class.
//!
//! ```toml
//! [oper_classes.chat-moderator]
//! title = "Chat Moderator"
//! capabilities = ["oper:local_kill", "oper:local_ban"]
//!
//! [oper_classes.server-admin]
//! title = "Server Admin"
//! extends = "chat-moderator"
//! capabilities = ["oper:rehash", "oper:die"]
//!
//! [opers.dan]
//! class = "server-admin"
//! password = "JDJhJDA0JG..."
//! modes = "+is acjknoqtux"
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::names::{NameError, casefold_name};
use crate::security::password::{PasswordError, decode_password_hash, verify_password};

/// Oper class resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperClassError {
    #[error("oper class [{class}] extends [{extends}], which doesn't exist")]
    MissingBase { class: String, extends: String },
    #[error("oper classes contain a looping dependency: {}", .cycle.join(" -> "))]
    LoopingDependency { cycle: Vec<String> },
}

/// Operator binding errors.
#[derive(Debug, Error)]
pub enum OperError {
    #[error("could not casefold oper name {name:?}: {source}")]
    InvalidName {
        name: String,
        #[source]
        source: NameError,
    },
    #[error("oper [{oper}] is defined more than once")]
    Duplicate { oper: String },
    #[error("could not decode password for oper [{oper}]: {source}")]
    Password {
        oper: String,
        #[source]
        source: PasswordError,
    },
    #[error("could not load oper [{oper}] - they use oper class [{class}] which does not exist")]
    UnknownClass { oper: String, class: String },
}

/// Raw `[oper_classes.<name>]` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperClassBlock {
    /// Display title, e.g. "Server Admin".
    pub title: String,
    /// WHOIS line override. Defaults to "is a <title>".
    #[serde(default)]
    pub whois_line: Option<String>,
    /// Name of the class this one inherits from.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl OperClassBlock {
    fn extends(&self) -> Option<&str> {
        self.extends.as_deref().filter(|base| !base.is_empty())
    }
}

/// Raw `[opers.<name>]` block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperBlock {
    /// Oper class name.
    pub class: String,
    #[serde(default)]
    pub vhost: Option<String>,
    #[serde(default)]
    pub whois_line: Option<String>,
    /// Encoded password hash (see `slircd-config genpasswd`).
    pub password: String,
    /// User modes applied on successful OPER.
    #[serde(default)]
    pub modes: String,
}

/// A flattened oper class with all inherited capabilities applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperClass {
    pub title: String,
    pub whois_line: String,
    pub capabilities: HashSet<String>,
}

impl OperClass {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    fn inherit(block: &OperClassBlock, base: Option<&OperClass>) -> Self {
        let mut capabilities = base
            .map(|base| base.capabilities.clone())
            .unwrap_or_default();
        capabilities.extend(block.capabilities.iter().cloned());

        let whois_line = match block.whois_line.as_deref() {
            Some(line) if !line.is_empty() => line.to_string(),
            _ => default_whois_line(&block.title),
        };

        Self {
            title: block.title.clone(),
            whois_line,
            capabilities,
        }
    }
}

/// "is a Bot" / "is an Admin", picking the article from the first letter only.
pub fn default_whois_line(title: &str) -> String {
    let article = match title.chars().next() {
        Some(first) if matches!(first.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("is {article} {title}").trim_end().to_string()
}

/// A configured operator bound to its resolved class.
#[derive(Debug, Clone)]
pub struct Oper {
    /// Casefolded oper name.
    pub name: String,
    pub class: Arc<OperClass>,
    pub whois_line: String,
    pub vhost: Option<String>,
    /// Decoded password hash.
    pub password: Vec<u8>,
    pub modes: String,
}

impl Oper {
    /// Check an OPER password attempt against the stored hash.
    pub fn verify_password(&self, attempt: &str) -> bool {
        verify_password(&self.password, attempt)
    }
}

/// Resolve the `extends` hierarchy into flattened classes.
///
/// Every dangling `extends` is reported before any cycle, so a class with a
/// missing base always fails with [`OperClassError::MissingBase`].
pub fn resolve_oper_classes(
    blocks: &BTreeMap<String, OperClassBlock>,
) -> Result<HashMap<String, Arc<OperClass>>, OperClassError> {
    for (name, block) in blocks {
        if let Some(base) = block.extends()
            && !blocks.contains_key(base)
        {
            return Err(OperClassError::MissingBase {
                class: name.clone(),
                extends: base.to_string(),
            });
        }
    }

    let mut resolved = HashMap::with_capacity(blocks.len());
    let mut path = Vec::new();
    for name in blocks.keys() {
        resolve_class(name, blocks, &mut resolved, &mut path)?;
    }
    Ok(resolved)
}

/// Depth-first resolution of one class. `path` holds the classes currently
/// being resolved, so meeting one of them again means a cycle.
fn resolve_class<'a>(
    name: &'a str,
    blocks: &'a BTreeMap<String, OperClassBlock>,
    resolved: &mut HashMap<String, Arc<OperClass>>,
    path: &mut Vec<&'a str>,
) -> Result<Arc<OperClass>, OperClassError> {
    if let Some(class) = resolved.get(name) {
        return Ok(Arc::clone(class));
    }

    if let Some(start) = path.iter().position(|visiting| *visiting == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(name.to_string());
        return Err(OperClassError::LoopingDependency { cycle });
    }

    // Every base was checked up front, so the lookup only misses for a
    // caller passing a name outside `blocks`.
    let Some(block) = blocks.get(name) else {
        return Err(OperClassError::MissingBase {
            class: path.last().map(|n| n.to_string()).unwrap_or_default(),
            extends: name.to_string(),
        });
    };

    path.push(name);
    let base = match block.extends() {
        Some(base) => Some(resolve_class(base, blocks, resolved, path)?),
        None => None,
    };
    path.pop();

    let class = Arc::new(OperClass::inherit(block, base.as_deref()));
    debug!(
        class = %name,
        extends = block.extends().unwrap_or(""),
        capabilities = class.capabilities.len(),
        "Resolved oper class"
    );
    resolved.insert(name.to_string(), Arc::clone(&class));
    Ok(class)
}

/// Bind operator blocks to their resolved classes, keyed by casefolded name.
pub fn bind_opers(
    blocks: &BTreeMap<String, OperBlock>,
    classes: &HashMap<String, Arc<OperClass>>,
) -> Result<HashMap<String, Oper>, OperError> {
    let mut opers = HashMap::with_capacity(blocks.len());

    for (raw_name, block) in blocks {
        let name = casefold_name(raw_name).map_err(|source| OperError::InvalidName {
            name: raw_name.clone(),
            source,
        })?;

        let password =
            decode_password_hash(&block.password).map_err(|source| OperError::Password {
                oper: name.clone(),
                source,
            })?;

        let class = classes
            .get(&block.class)
            .ok_or_else(|| OperError::UnknownClass {
                oper: name.clone(),
                class: block.class.clone(),
            })?;

        let whois_line = match block.whois_line.as_deref() {
            Some(line) if !line.is_empty() => line.to_string(),
            _ => class.whois_line.clone(),
        };

        let oper = Oper {
            name: name.clone(),
            class: Arc::clone(class),
            whois_line,
            vhost: block.vhost.clone().filter(|vhost| !vhost.is_empty()),
            password,
            modes: block.modes.trim().to_string(),
        };

        debug!(oper = %name, class = %block.class, "Bound oper");
        if opers.insert(name.clone(), oper).is_some() {
            return Err(OperError::Duplicate { oper: name });
        }
    }

    Ok(opers)
}
