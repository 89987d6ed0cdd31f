use core::fmt;
use core::str::FromStr;

/// An account name qualified by its authority, rendered as `domain\account`.
///
/// A local account carries the machine name as its domain; a name with an
/// empty domain renders as the bare account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub domain: String,
    pub account: String,
}

impl QualifiedName {
    #[must_use]
    pub fn new(domain: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            account: account.into(),
        }
    }

    /// An unqualified name (no domain part).
    #[must_use]
    pub fn bare(account: impl Into<String>) -> Self {
        Self::new(String::new(), account)
    }

    /// Qualifies a bare name with `domain`; already-qualified names are
    /// left untouched.
    #[must_use]
    pub fn qualify(self, domain: &str) -> Self {
        if self.domain.is_empty() {
            Self::new(domain, self.account)
        } else {
            self
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            f.write_str(&self.account)
        } else {
            write!(f, "{}\\{}", self.domain, self.account)
        }
    }
}

impl FromStr for QualifiedName {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once('\\') {
            Some((domain, account)) => Self::new(domain, account),
            None => Self::bare(s),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn display_omits_empty_domain() {
        assert_eq!(QualifiedName::bare("alice").to_string(), "alice");
        assert_eq!(
            QualifiedName::new("CORP", "alice").to_string(),
            "CORP\\alice"
        );
    }

    #[test]
    fn parse_splits_on_first_backslash() {
        let parsed: QualifiedName = "CORP\\svc\\odd".parse().unwrap();
        assert_eq!(parsed, QualifiedName::new("CORP", "svc\\odd"));
        let bare: QualifiedName = "alice".parse().unwrap();
        assert_eq!(bare, QualifiedName::bare("alice"));
    }

    #[test]
    fn qualify_only_touches_bare_names() {
        let q = QualifiedName::bare("svc").qualify("CORP");
        assert_eq!(q, QualifiedName::new("CORP", "svc"));
        let untouched = QualifiedName::new("OTHER", "svc").qualify("CORP");
        assert_eq!(untouched.domain, "OTHER");
    }
}
