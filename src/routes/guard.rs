use reqwest::Url;

use crate::{models::Role, session::SessionSnapshot};

/// The login screen.
pub const LOGIN_PATH: &str = "/login";

/// Where authenticated users without the required role are sent.
pub const LANDING_PATH: &str = "/";

/// Query parameter carrying the originally requested destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// GuardDecision
///
/// Outcome of a navigation check. There is no error case: every failure is
/// expressed as a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Not authenticated. `redirect` is the destination to resume after login.
    RedirectToLogin { redirect: String },
    /// Authenticated, but the role is not permitted on the target.
    RedirectToLanding,
}

impl GuardDecision {
    /// Where the navigation should go instead, `None` when it is allowed.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin { redirect } => Some(format!(
                "{LOGIN_PATH}?{REDIRECT_PARAM}={}",
                escape_query_value(redirect)
            )),
            GuardDecision::RedirectToLanding => Some(LANDING_PATH.to_string()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// check
///
/// Decides a navigation to `target` given the roles the route permits.
///
/// 1. No required roles: the route is public, allow.
/// 2. No role in the session (which includes "no token"): send to login,
///    carrying `target` so navigation can resume afterwards.
/// 3. Role permitted: allow.
/// 4. Otherwise: send to the landing route.
pub fn check(required: &[Role], session: &SessionSnapshot, target: &str) -> GuardDecision {
    if required.is_empty() {
        return GuardDecision::Allow;
    }

    // `SessionSnapshot::role` is only set alongside a token.
    let Some(role) = session.role() else {
        return GuardDecision::RedirectToLogin {
            redirect: target.to_string(),
        };
    };

    if required.contains(&role) {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLanding
    }
}

/// redirect_target
///
/// Reads the resumable destination back out of a login URL's query string.
/// Only same-site absolute paths are honoured; anything else (missing,
/// `//evil.example`, `https://...`) resumes at the landing route.
pub fn redirect_target(query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    Url::parse(&format!("http://localhost{LOGIN_PATH}?{query}"))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == REDIRECT_PARAM)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|path| is_same_site_path(path))
        .unwrap_or_else(|| LANDING_PATH.to_string())
}

/// True for a path that stays on the current origin once a browser resolves it.
/// Browsers read `\` as `/` in http URLs, so `/\host` is as off-site as `//host`.
fn is_same_site_path(path: &str) -> bool {
    let mut chars = path.chars();
    if chars.next() != Some('/') || matches!(chars.next(), Some('/' | '\\')) {
        return false;
    }
    if path.chars().any(char::is_control) {
        return false;
    }
    let Ok(base) = Url::parse("http://localhost/") else {
        return false;
    };
    base.join(path)
        .is_ok_and(|joined| joined.origin() == base.origin())
}

// Only the characters that would break the surrounding query are escaped so
// that the usual `/login?redirect=/user-management` stays readable.
fn escape_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '#' => out.push_str("%23"),
            '+' => out.push_str("%2B"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}
