use std::fmt;

use super::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub title: &'static str,
    pub body: &'static str,
}

/// Static content of `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub tagline: &'static str,
    pub headline: &'static str,
    pub intro: &'static str,
    pub steps: [Step; 3],
    /// `(label, target)`; both calls to action lead to the task list.
    pub actions: [(&'static str, Route); 2],
}

pub const LANDING: Landing = Landing {
    tagline: "Built on Shardeum",
    headline: "Decentralized Task Board with Trustless Escrow",
    intro: "Post micro-tasks with escrowed rewards, claim work that matches your skills, \
            and get paid automatically when approved. No intermediaries, just smart contracts.",
    steps: [
        Step {
            title: "1. Post Tasks",
            body: "Create tasks with detailed descriptions and lock SHM tokens as rewards in smart contract escrow",
        },
        Step {
            title: "2. Claim & Work",
            body: "Browse available tasks, claim ones that match your skills, and submit your completed work",
        },
        Step {
            title: "3. Get Approved",
            body: "Task posters review submissions and approve quality work, automatically releasing escrowed funds",
        },
    ],
    actions: [("Get Started", Route::Tasks), ("View Tasks", Route::Tasks)],
};

impl fmt::Display for Landing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tagline)?;
        writeln!(f, "{}", self.headline)?;
        writeln!(f, "{}", self.intro)?;
        writeln!(f)?;
        writeln!(f, "How It Works")?;
        for step in &self.steps {
            writeln!(f, "  {}", step.title)?;
            writeln!(f, "    {}", step.body)?;
        }
        writeln!(f)?;
        let actions: Vec<String> = self
            .actions
            .iter()
            .map(|(label, route)| format!("{} ({})", label, route))
            .collect();
        write!(f, "{}", actions.join("  "))
    }
}
