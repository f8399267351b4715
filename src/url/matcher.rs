use serde::Deserialize;

/// How a link host is compared against the target domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainMatch {
    /// The host contains the target domain anywhere
    ///
    /// This is permissive: with target `x.edu`, `evil-x.edu.attacker.com`
    /// is internal.
    #[default]
    Substring,

    /// The host is the target domain or one of its dot-delimited subdomains
    Suffix,
}

impl DomainMatch {
    /// Checks whether `host` belongs to `target` under this mode
    ///
    /// Both arguments are expected in lowercase.
    ///
    /// # Examples
    ///
    /// ```
    /// use web_census::url::DomainMatch;
    ///
    /// assert!(DomainMatch::Substring.matches("x.edu", "lib.x.edu"));
    /// assert!(DomainMatch::Substring.matches("x.edu", "evil-x.edu.attacker.com"));
    ///
    /// assert!(DomainMatch::Suffix.matches("x.edu", "x.edu"));
    /// assert!(DomainMatch::Suffix.matches("x.edu", "lib.x.edu"));
    /// assert!(!DomainMatch::Suffix.matches("x.edu", "evil-x.edu.attacker.com"));
    /// ```
    pub fn matches(&self, target: &str, host: &str) -> bool {
        match self {
            Self::Substring => host.contains(target),
            Self::Suffix => {
                host == target
                    || host
                        .strip_suffix(target)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }
}
