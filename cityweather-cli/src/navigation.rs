//! Stack router over the app's two screens.

use cityweather_core::ViewState;

use crate::screens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Rest,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Rest => "Rest",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StackOptions {
    pub header_shown: bool,
}

#[derive(Debug)]
pub struct Navigator {
    stack: Vec<Route>,
    options: StackOptions,
}

impl Navigator {
    pub fn new(initial: Route, options: StackOptions) -> Self {
        Self { stack: vec![initial], options }
    }

    pub fn current(&self) -> Route {
        // The initial route is never popped.
        self.stack.last().copied().unwrap_or(Route::Home)
    }

    /// Push `route` unless it is already on top.
    pub fn navigate(&mut self, route: Route) {
        if self.current() != route {
            self.stack.push(route);
        }
    }

    /// Pop the top screen. Returns false when already at the root.
    pub fn go_back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    pub fn render(&self, view: &ViewState) -> String {
        let route = self.current();
        let body = match route {
            Route::Home => screens::home::render(view),
            Route::Rest => screens::rest::render(),
        };

        if self.options.header_shown {
            format!("== {} ==\n{body}", route.title())
        } else {
            body
        }
    }
}
