//! Routed screens. Each page is a plain model driven by the caller; none of them
//! holds connection state of its own, they read it through the gateway's handle.
mod browse;
mod dashboard;
mod landing;
mod post;

pub use browse::BrowsePage;
pub use dashboard::{DashboardPage, DashboardStats};
pub use landing::{Landing, Step, LANDING};
pub use post::{PostPage, Submission};

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Tasks,
    Post,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Landing, Route::Tasks, Route::Post, Route::Dashboard];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Tasks => "/tasks",
            Route::Post => "/post",
            Route::Dashboard => "/me",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        Route::ALL.iter().copied().find(|r| r.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::from_path(s).ok_or_else(|| format!("no screen at {:?}", s))
    }
}
