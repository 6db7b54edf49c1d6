//! The `resource:action:scope` permission grammar.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::model::UserProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Only entities tied to the requesting user.
    Own,
    /// Every entity of the resource.
    Any,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Any => "any",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PermissionParseError {
    #[error("permission {0:?} is not of the form resource:action:scope")]
    Shape(String),
    #[error("permission {0:?} has unknown scope (expected own or any)")]
    Scope(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permission {
    resource: String,
    action: String,
    scope: Scope,
}

impl Permission {
    pub fn new(resource: &str, action: &str, scope: Scope) -> Self {
        Self {
            resource: normalize(resource),
            action: normalize(action),
            scope,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            resource: self.resource.clone(),
            action: self.action.clone(),
            scope,
        }
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(raw);
        let mut parts = normalized.split(':');
        let (Some(resource), Some(action), Some(scope), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PermissionParseError::Shape(raw.to_string()));
        };
        if resource.is_empty() || action.is_empty() {
            return Err(PermissionParseError::Shape(raw.to_string()));
        }
        let scope = match scope {
            "own" => Scope::Own,
            "any" => Scope::Any,
            _ => return Err(PermissionParseError::Scope(raw.to_string())),
        };
        Ok(Self {
            resource: resource.to_string(),
            action: action.to_string(),
            scope,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.resource, self.action, self.scope.as_str())
    }
}

pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// The permission strings granted to one user, case-normalized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            granted: permissions
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Empty when nobody is signed in.
    pub fn for_user(user: Option<&UserProfile>) -> Self {
        user.map(|u| Self::new(&u.permissions)).unwrap_or_default()
    }

    /// Exact match, or an `any`-scoped grant standing in for a required `own`.
    /// There is no other substitution.
    pub fn has_permission(&self, required: &str) -> bool {
        let required = normalize(required);
        if self.granted.contains(&required) {
            return true;
        }
        match required.parse::<Permission>() {
            Ok(p) if p.scope() == Scope::Own => {
                self.granted.contains(&p.with_scope(Scope::Any).to_string())
            }
            _ => false,
        }
    }

    pub fn has_any(&self, required: &[String]) -> bool {
        required.iter().any(|p| self.has_permission(p))
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.granted.iter().map(String::as_str)
    }
}
