//! Node identity in the interaction graph

use serde::{Deserialize, Serialize};

/// Integer sign of a positive (up) regulation
pub const INT_PLUS: u8 = 0;
/// Integer sign of a negative (down) regulation
pub const INT_MINUS: u8 = 1;

/// Identity of a node in either graph view.
///
/// The unsigned view keys nodes by name alone; the signed view keys every
/// entity twice, once per regulation sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<u8>,
}

impl NodeKey {
    /// Key for the unsigned graph view
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sign: None,
        }
    }

    /// Key for the signed graph view
    pub fn signed(name: impl Into<String>, sign: u8) -> Self {
        Self {
            name: name.into(),
            sign: Some(sign),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.sign.is_some()
    }

    /// Same entity under a different sign
    pub fn with_sign(&self, sign: u8) -> Self {
        Self::signed(self.name.clone(), sign)
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sign {
            Some(INT_PLUS) => write!(f, "{}(+)", self.name),
            Some(_) => write!(f, "{}(-)", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self::unsigned(s)
    }
}

impl From<(&str, u8)> for NodeKey {
    fn from((name, sign): (&str, u8)) -> Self {
        Self::signed(name, sign)
    }
}

/// Grounding attributes attached to every graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttrs {
    /// Namespace, e.g. "HGNC"
    pub ns: String,
    /// Identifier within the namespace
    pub id: String,
}

impl NodeAttrs {
    pub fn new(ns: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            id: id.into(),
        }
    }
}
