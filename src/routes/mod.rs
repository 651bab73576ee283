/// Route Table Index
///
/// The application's navigation surface, grouped by who may reach each screen.
/// The grouping is for readability only: access is decided per route by the
/// roles attached to it, through `guard::check`.
///
/// Routes accessible to everyone, including anonymous visitors.
pub mod public;

/// Routes for any signed-in role.
pub mod authenticated;

/// Routes for roles that manage other users.
pub mod admin;

/// The navigation predicate.
pub mod guard;

use crate::{models::Role, session::SessionSnapshot};
use guard::GuardDecision;

/// Upper bound on chained redirects before a path is treated as unresolvable.
const MAX_REDIRECTS: usize = 8;

/// What a route path leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Renders the named view.
    View(&'static str),
    /// Sends the navigation on to another path.
    Redirect(&'static str),
}

/// RouteDef
///
/// One static route: a path, its target, and the roles permitted on it.
/// An empty role list means the route is public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub target: RouteTarget,
    pub required_roles: Vec<Role>,
}

impl RouteDef {
    pub fn view(path: &'static str, view: &'static str) -> Self {
        Self {
            path,
            target: RouteTarget::View(view),
            required_roles: Vec::new(),
        }
    }

    pub fn redirect(path: &'static str, to: &'static str) -> Self {
        Self {
            path,
            target: RouteTarget::Redirect(to),
            required_roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: &[Role]) -> Self {
        self.required_roles = roles.to_vec();
        self
    }

    pub fn is_public(&self) -> bool {
        self.required_roles.is_empty()
    }
}

/// A path resolved through the table's redirects to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    /// The final path after following redirects.
    pub path: &'static str,
    pub view: &'static str,
    pub required_roles: &'a [Role],
    /// Whether one or more redirects were followed.
    pub redirected: bool,
}

/// Navigation
///
/// The full outcome of navigating to a URL: route resolution plus the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render {
        path: &'static str,
        view: &'static str,
    },
    Redirect(String),
    NotFound,
}

/// RouteTable
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(app_routes())
    }
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Exact path lookup. The query string, fragment and a trailing slash are ignored.
    pub fn find(&self, path: &str) -> Option<&RouteDef> {
        let path = normalize_path(path);
        self.routes.iter().find(|route| route.path == path)
    }

    /// resolve
    ///
    /// Follows redirect routes until a view is reached. Unknown paths, and
    /// redirect chains longer than `MAX_REDIRECTS` (loops), resolve to `None`.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let mut route = self.find(path)?;
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            match route.target {
                RouteTarget::View(view) => {
                    return Some(ResolvedRoute {
                        path: route.path,
                        view,
                        required_roles: &route.required_roles,
                        redirected,
                    });
                }
                RouteTarget::Redirect(to) => {
                    route = self.find(to)?;
                    redirected = true;
                }
            }
        }

        tracing::warn!(path, "redirect loop in route table");
        None
    }

    /// The guard decision for `target`, or `None` when the path is unknown.
    pub fn guard(&self, target: &str, session: &SessionSnapshot) -> Option<GuardDecision> {
        let resolved = self.resolve(target)?;
        Some(guard::check(resolved.required_roles, session, target))
    }

    /// navigate
    ///
    /// Resolves `target` and applies the guard to the route it lands on.
    /// Redirect routes are reported as a redirect to the final path so the
    /// caller's location reflects where the user actually is.
    pub fn navigate(&self, target: &str, session: &SessionSnapshot) -> Navigation {
        let Some(resolved) = self.resolve(target) else {
            return Navigation::NotFound;
        };

        let decision = guard::check(resolved.required_roles, session, target);
        if let Some(location) = decision.location() {
            return Navigation::Redirect(location);
        }

        if resolved.redirected {
            Navigation::Redirect(resolved.path.to_string())
        } else {
            Navigation::Render {
                path: resolved.path,
                view: resolved.view,
            }
        }
    }
}

/// Every route of the application, in declaration order.
pub fn app_routes() -> Vec<RouteDef> {
    let mut routes = public::public_routes();
    routes.extend(authenticated::authenticated_routes());
    routes.extend(admin::admin_routes());
    routes
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
