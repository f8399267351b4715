//! robots.txt parser
//!
//! Parses the allow/disallow subset of robots.txt into per-agent prefix
//! lists and answers path queries with longest-prefix matching.

use std::collections::HashMap;

/// Agent name used for the wildcard group
pub const WILDCARD_AGENT: &str = "*";

/// Allow and disallow path prefixes for a single user agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRules {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

impl AgentRules {
    /// Decides a path against this group alone
    ///
    /// Returns `None` when no prefix matches. Among matching prefixes the
    /// longest wins; an allow and a disallow of equal length resolve to allow.
    pub fn decide(&self, path: &str) -> Option<bool> {
        let mut best: Option<(usize, bool)> = None;

        let candidates = self
            .allow
            .iter()
            .map(|p| (p, true))
            .chain(self.disallow.iter().map(|p| (p, false)));

        for (prefix, allowed) in candidates {
            if !path.starts_with(prefix.as_str()) {
                continue;
            }
            let len = prefix.len();
            best = match best {
                Some((best_len, best_allowed))
                    if best_len > len || (best_len == len && (best_allowed || !allowed)) =>
                {
                    Some((best_len, best_allowed))
                }
                _ => Some((len, allowed)),
            };
        }

        best.map(|(_, allowed)| allowed)
    }

    fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }
}

/// Parsed robots.txt rules for one host, grouped by lowercase agent name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRuleSet {
    groups: HashMap<String, AgentRules>,
}

impl RobotsRuleSet {
    /// A rule set with no rules, which allows every path
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses robots.txt content
    ///
    /// # Parsing Rules
    ///
    /// - Blank lines and `#` comments (whole-line or trailing) are skipped
    /// - Lines without a `:` separator are skipped
    /// - `user-agent:` switches the current agent; an empty value means `*`
    /// - `allow:` and `disallow:` append a prefix to the current agent,
    ///   which starts out as `*`
    /// - Empty allow/disallow values are ignored
    /// - Prefixes always start with `/`
    /// - Directive names and agents are case-insensitive; prefixes are not
    /// - Any other directive (sitemap, crawl-delay, ...) is ignored
    ///
    /// # Example
    ///
    /// ```
    /// use web_census::robots::RobotsRuleSet;
    ///
    /// let rules = RobotsRuleSet::parse("User-agent: *\nDisallow: /a\nAllow: /a/b\n");
    /// assert!(rules.is_allowed("/a/b/c", "*"));
    /// assert!(!rules.is_allowed("/a/x", "*"));
    /// assert!(rules.is_allowed("/elsewhere", "*"));
    /// ```
    pub fn parse(content: &str) -> Self {
        let mut groups: HashMap<String, AgentRules> = HashMap::new();
        let mut current_agent = WILDCARD_AGENT.to_string();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    current_agent = if value.is_empty() {
                        WILDCARD_AGENT.to_string()
                    } else {
                        value.to_ascii_lowercase()
                    };
                }
                "allow" | "disallow" => {
                    if value.is_empty() {
                        continue;
                    }
                    let prefix = if value.starts_with('/') {
                        value.to_string()
                    } else {
                        format!("/{}", value)
                    };
                    let rules = groups.entry(current_agent.clone()).or_default();
                    if key == "allow" {
                        rules.allow.push(prefix);
                    } else {
                        rules.disallow.push(prefix);
                    }
                }
                _ => {}
            }
        }

        Self { groups }
    }

    /// Returns true when no group carries any rule
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(AgentRules::is_empty)
    }

    /// Returns the rules recorded for an agent, if any
    pub fn rules_for(&self, user_agent: &str) -> Option<&AgentRules> {
        self.groups.get(&user_agent.to_ascii_lowercase())
    }

    /// Checks if a path is allowed for the given user agent
    ///
    /// The agent's own group is consulted first. If none of its prefixes
    /// match, the `*` group decides. A path no prefix matches is allowed.
    pub fn is_allowed(&self, path: &str, user_agent: &str) -> bool {
        let agent = user_agent.trim().to_ascii_lowercase();

        if agent != WILDCARD_AGENT {
            if let Some(decision) = self.groups.get(&agent).and_then(|r| r.decide(path)) {
                return decision;
            }
        }

        self.groups
            .get(WILDCARD_AGENT)
            .and_then(|r| r.decide(path))
            .unwrap_or(true)
    }
}
