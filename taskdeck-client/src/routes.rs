/// Routes and the authentication guard
///
/// | Path                       | Route                | Access    |
/// |----------------------------|----------------------|-----------|
/// | `/login`                   | `Login`              | public    |
/// | `/signup`                  | `Signup`             | public    |
/// | `/` , `/projects`          | `Projects`           | protected |
/// | `/projects/dashboard`      | `Dashboard`          | protected |
/// | `/projects/{slug}/tasks`   | `TaskBoard { slug }` | protected |
///
/// The guard never fetches anything itself. It maps the current
/// [`AuthState`] onto a navigation decision; callers re-resolve whenever the
/// session publishes a new state.

use std::fmt;
use std::str::FromStr;

use crate::session::AuthState;

/// A view the user can navigate to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    Projects,
    Dashboard,
    TaskBoard { project_slug: String },
}

impl Route {
    /// True for views that require a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Signup)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Projects => "/projects".to_string(),
            Route::Dashboard => "/projects/dashboard".to_string(),
            Route::TaskBoard { project_slug } => format!("/projects/{}/tasks", project_slug),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Path that matches no route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route for {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["projects"] => Ok(Route::Projects),
            ["login"] => Ok(Route::Login),
            ["signup"] => Ok(Route::Signup),
            ["projects", "dashboard"] => Ok(Route::Dashboard),
            ["projects", slug, "tasks"] => Ok(Route::TaskBoard {
                project_slug: slug.to_string(),
            }),
            _ => Err(UnknownRoute(path.to_string())),
        }
    }
}

/// What to show for a requested route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested view
    Render(Route),

    /// Session not resolved yet; show a loading indicator
    Loading,

    /// Go somewhere else instead
    Redirect(Route),
}

/// Gates protected routes on the session state
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn resolve(route: Route, auth: &AuthState) -> Navigation {
        if !route.is_protected() {
            return Navigation::Render(route);
        }

        match auth {
            AuthState::Authenticated(_) => Navigation::Render(route),
            AuthState::Unknown => Navigation::Loading,
            AuthState::Unauthenticated => Navigation::Redirect(Route::Login),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_shared::models::{EntityId, User};

    fn user() -> User {
        User {
            id: EntityId::from("3"),
            username: "kp121".to_string(),
            email: "kp@example.com".to_string(),
            organization: None,
        }
    }

    #[test]
    fn test_parse_paths() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Projects);
        assert_eq!("/projects/".parse::<Route>().unwrap(), Route::Projects);
        assert_eq!("/login".parse::<Route>().unwrap(), Route::Login);
        assert_eq!("/projects/dashboard".parse::<Route>().unwrap(), Route::Dashboard);
        assert_eq!(
            "/projects/website/tasks".parse::<Route>().unwrap(),
            Route::TaskBoard {
                project_slug: "website".to_string()
            }
        );
        assert!("/projects/website".parse::<Route>().is_err());
        assert!("/admin".parse::<Route>().is_err());
    }

    #[test]
    fn test_path_round_trip() {
        let route = Route::TaskBoard {
            project_slug: "mobile-app".to_string(),
        };
        assert_eq!(route.path().parse::<Route>().unwrap(), route);
    }

    #[test]
    fn test_public_routes_always_render() {
        for auth in [AuthState::Unknown, AuthState::Unauthenticated, AuthState::Authenticated(user())] {
            assert_eq!(
                RouteGuard::resolve(Route::Login, &auth),
                Navigation::Render(Route::Login)
            );
            assert_eq!(
                RouteGuard::resolve(Route::Signup, &auth),
                Navigation::Render(Route::Signup)
            );
        }
    }

    #[test]
    fn test_protected_route_waits_while_unknown() {
        assert_eq!(
            RouteGuard::resolve(Route::Dashboard, &AuthState::Unknown),
            Navigation::Loading
        );
    }

    #[test]
    fn test_protected_route_redirects_when_unauthenticated() {
        assert_eq!(
            RouteGuard::resolve(Route::Projects, &AuthState::Unauthenticated),
            Navigation::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_protected_route_renders_when_authenticated() {
        let route = Route::TaskBoard {
            project_slug: "website".to_string(),
        };
        assert_eq!(
            RouteGuard::resolve(route.clone(), &AuthState::Authenticated(user())),
            Navigation::Render(route)
        );
    }
}
