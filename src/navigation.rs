//! Navigation gate — picks the screen tree from the onboarding flag.

/// Screens inside the main (post-onboarding) flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Profile,
}

/// Back-stack for the main flow. Always rooted at `Home`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            stack: vec![Route::Home],
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Route {
        *self.stack.last().unwrap_or(&Route::Home)
    }

    /// Push `route` unless it's already on top.
    pub fn navigate(&mut self, route: Route) {
        if self.current() != route {
            self.stack.push(route);
        }
    }

    /// Pop one screen. Returns false at the root.
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// The two top-level trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenTree {
    Onboarding,
    Main(Navigator),
}

/// Pure function of the onboarding flag.
pub fn gate(onboarding_complete: bool) -> ScreenTree {
    if onboarding_complete {
        ScreenTree::Main(Navigator::new())
    } else {
        ScreenTree::Onboarding
    }
}
