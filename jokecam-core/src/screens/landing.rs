// jokecam-core/src/screens/landing.rs
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Joke,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Joke => "/joke",
        }
    }
}

/// The first screen: a greeting and one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingScreen {
    pub title: &'static str,
    pub link_label: &'static str,
    pub link_target: Route,
}

impl Default for LandingScreen {
    fn default() -> Self {
        Self {
            title: "Hello, Profiq",
            link_label: "Tell me a joke",
            link_target: Route::Joke,
        }
    }
}

/// Stack of visited routes. The root is always `Route::Landing`.
#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            stack: vec![Route::Landing],
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Route {
        // The root is never popped.
        *self.stack.last().unwrap_or(&Route::Landing)
    }

    pub fn navigate(&mut self, route: Route) {
        debug!(from = self.current().path(), to = route.path(), "Navigating.");
        self.stack.push(route);
    }

    /// Pops the current route. Returns false when already at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_links_to_joke() {
        let landing = LandingScreen::default();
        assert_eq!(landing.link_target, Route::Joke);
        assert_eq!(landing.link_target.path(), "/joke");
    }

    #[test]
    fn test_navigator_never_pops_root() {
        let mut nav = Navigator::new();
        assert_eq!(nav.current(), Route::Landing);
        nav.navigate(Route::Joke);
        assert_eq!(nav.current(), Route::Joke);
        assert!(nav.back());
        assert_eq!(nav.current(), Route::Landing);
        assert!(!nav.back());
        assert_eq!(nav.current(), Route::Landing);
    }
}
