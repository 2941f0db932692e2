//! Ordered, path-scoped authorization policies.
//!
//! A `SecurityChain` is a list of `SecurityPolicy` values sorted by their
//! order. For each request the first policy whose `PathPattern` matches the
//! request path decides the outcome; requests no policy matches are not
//! governed by the chain at all.
//!
//! Orders must be unique within a chain. The builder rejects duplicates so
//! precedence is never ambiguous at request time.

use std::fmt;

use tracing::debug;

use crate::context::SecurityContext;
use crate::error::ChainConfigError;

/// One segment of a parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// `*` or a glob such as `*.css`; matches within one segment.
    Glob(String),
    /// `**`; matches zero or more segments.
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            Self::AnyDepth
        } else if raw.contains('*') {
            Self::Glob(raw.to_string())
        } else {
            Self::Literal(raw.to_string())
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::Literal(text) => text == segment,
            Self::Glob(glob) => glob_matches(glob, segment),
            Self::AnyDepth => true,
        }
    }
}

/// Matches `text` against a single-segment glob where `*` stands for any run
/// of characters.
fn glob_matches(glob: &str, text: &str) -> bool {
    let parts: Vec<&str> = glob.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for part in middle {
        match remaining.find(part) {
            Some(index) => remaining = &remaining[index + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => path
            .split_first()
            .is_some_and(|(head, tail)| segment.matches(head) && match_segments(rest, tail)),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// An Ant-style request path pattern.
///
/// Supported forms:
/// - literal paths: `/signin/github`
/// - `*` within a segment: `/docs/*/reference`, `/assets/*.css`
/// - `**` for any depth: `/admin/**` matches `/admin` and everything below it
///
/// Matching is case-sensitive and ignores empty segments, so a trailing slash
/// does not change the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern.
    ///
    /// # Errors
    ///
    /// Returns `ChainConfigError::InvalidPattern` if the pattern does not
    /// start with `/` or embeds `**` inside a segment.
    pub fn parse(pattern: &str) -> Result<Self, ChainConfigError> {
        if !pattern.starts_with('/') {
            return Err(ChainConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "must start with '/'".to_string(),
            });
        }

        let segments: Vec<Segment> = split_path(pattern).into_iter().map(Segment::parse).collect();

        if segments
            .iter()
            .any(|s| matches!(s, Segment::Glob(glob) if glob.contains("**")))
        {
            return Err(ChainConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "'**' must be a whole segment".to_string(),
            });
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns true if the request path matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match_segments(&self.segments, &split_path(path))
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Who a policy lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Only requests without an authentication. Signed-in users are denied.
    Anonymous,
    /// Only requests with an authentication.
    Authenticated,
    /// Everyone.
    PermitAll,
}

impl AccessRule {
    fn allows(self, context: &SecurityContext) -> bool {
        match self {
            Self::Anonymous => context.is_anonymous(),
            Self::Authenticated => context.is_authenticated(),
            Self::PermitAll => true,
        }
    }
}

/// What an unauthenticated request receives when a policy requires
/// authentication.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntryPoint {
    /// Redirect to a sign-in page.
    LoginUrl(String),
    /// Respond with `401 Unauthorized`.
    #[default]
    Unauthorized,
}

impl EntryPoint {
    /// Redirect entry point for the given sign-in URL.
    #[must_use]
    pub fn login_url(url: impl Into<String>) -> Self {
        Self::LoginUrl(url.into())
    }
}

/// The chain's verdict for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the request through to its handler.
    Permit,
    /// Send the client to this URL (an entry point redirect).
    Redirect(String),
    /// Authentication required and no redirect configured.
    Unauthorized,
    /// The caller is authenticated but not allowed here.
    Forbidden,
}

/// A single path-scoped authorization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    order: i32,
    pattern: PathPattern,
    rule: AccessRule,
    entry_point: EntryPoint,
}

impl SecurityPolicy {
    /// Creates a policy with the default (`401`) entry point.
    ///
    /// Lower orders are evaluated first.
    ///
    /// # Errors
    ///
    /// Returns `ChainConfigError::InvalidPattern` if the pattern is invalid.
    pub fn new(order: i32, pattern: &str, rule: AccessRule) -> Result<Self, ChainConfigError> {
        Ok(Self {
            order,
            pattern: PathPattern::parse(pattern)?,
            rule,
            entry_point: EntryPoint::default(),
        })
    }

    /// Sets the entry point used when this policy rejects an anonymous request.
    #[must_use]
    pub fn with_entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Returns the evaluation order.
    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the access rule.
    #[must_use]
    pub fn rule(&self) -> AccessRule {
        self.rule
    }

    /// Returns the entry point.
    #[must_use]
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }

    fn decide(&self, context: &SecurityContext) -> Decision {
        if self.rule.allows(context) {
            return Decision::Permit;
        }
        if context.is_authenticated() {
            return Decision::Forbidden;
        }
        match &self.entry_point {
            EntryPoint::LoginUrl(url) => Decision::Redirect(url.clone()),
            EntryPoint::Unauthorized => Decision::Unauthorized,
        }
    }
}

/// An ordered set of policies with unique orders.
#[derive(Debug, Clone, Default)]
pub struct SecurityChain {
    policies: Vec<SecurityPolicy>,
}

impl SecurityChain {
    /// Starts building a chain.
    #[must_use]
    pub fn builder() -> SecurityChainBuilder {
        SecurityChainBuilder::default()
    }

    /// Returns the policy governing `path`, if any.
    #[must_use]
    pub fn policy_for(&self, path: &str) -> Option<&SecurityPolicy> {
        self.policies.iter().find(|p| p.pattern.matches(path))
    }

    /// Decides the outcome for a request to `path` made with `context`.
    #[must_use]
    pub fn evaluate(&self, path: &str, context: &SecurityContext) -> Decision {
        let Some(policy) = self.policy_for(path) else {
            return Decision::Permit;
        };
        let decision = policy.decide(context);
        debug!(
            path,
            pattern = %policy.pattern,
            order = policy.order,
            ?decision,
            "security chain decision"
        );
        decision
    }

    /// Returns the policies in evaluation order.
    #[must_use]
    pub fn policies(&self) -> &[SecurityPolicy] {
        &self.policies
    }
}

/// Builder for `SecurityChain`.
#[derive(Debug, Default)]
pub struct SecurityChainBuilder {
    policies: Vec<SecurityPolicy>,
}

impl SecurityChainBuilder {
    /// Adds a policy. Declaration order does not matter.
    #[must_use]
    pub fn policy(mut self, policy: SecurityPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Sorts the policies by order and checks that no two share an order.
    ///
    /// # Errors
    ///
    /// Returns `ChainConfigError::DuplicateOrder` naming both patterns.
    pub fn build(mut self) -> Result<SecurityChain, ChainConfigError> {
        self.policies.sort_by_key(SecurityPolicy::order);

        if let Some(pair) = self
            .policies
            .windows(2)
            .find(|pair| pair[0].order == pair[1].order)
        {
            return Err(ChainConfigError::DuplicateOrder {
                order: pair[0].order,
                first: pair[0].pattern.to_string(),
                second: pair[1].pattern.to_string(),
            });
        }

        Ok(SecurityChain {
            policies: self.policies,
        })
    }
}
