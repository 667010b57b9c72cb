//! A small scripted command console.
//!
//! Every answer comes from a [`TerminalProfile`], so the console holds no
//! global tables and can be reconfigured from the `[terminal]` section of
//! the configuration file.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prompt marker printed before each echoed command.
pub const PROMPT: &str = "➜";

/// Clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Everything the console can say about its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalProfile {
    /// Owner name used in the help listing.
    pub name: String,
    /// Window title shown above the welcome banner.
    pub prompt_title: String,
    pub welcome: String,
    pub about: String,
    pub skills: Vec<String>,
    pub contact: Vec<String>,
}

impl Default for TerminalProfile {
    fn default() -> Self {
        Self {
            name: "Zameer".to_string(),
            prompt_title: "user@zameer-portfolio:~".to_string(),
            welcome: "Welcome to Zameer's Neural Interface v1.0.".to_string(),
            about: "Zameer Haider is an Accounts Officer & CAF Aspirant merging financial \
                    discipline with AI automation. Based in Lahore."
                .to_string(),
            skills: vec![
                "Financial Accounting".to_string(),
                "ERP Systems".to_string(),
                "Advanced Excel".to_string(),
                "AI Workflow Integration".to_string(),
            ],
            contact: vec![
                "Email: owner@example.com".to_string(),
                "LinkedIn: linkedin.com/in/example".to_string(),
            ],
        }
    }
}

/// Source of the current time for the `date` command.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Local>,
{
    fn now(&self) -> DateTime<Local> {
        self()
    }
}

/// Outcome of one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Text(String),
    /// The screen and history were cleared.
    Clear,
    /// Blank line; nothing to print.
    Empty,
    /// Holds the normalized command that was not recognised.
    NotFound(String),
}

impl Response {
    /// Text to show for this response, if any.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::NotFound(cmd) => Some(format!(
                "Command not found: {cmd}. Type 'help' for assistance."
            )),
            Self::Clear | Self::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    About,
    Skills,
    Contact,
    Date,
    Clear,
}

impl Command {
    const ALL: [Command; 6] = [
        Command::About,
        Command::Skills,
        Command::Contact,
        Command::Clear,
        Command::Date,
        Command::Help,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::About => "about",
            Self::Skills => "skills",
            Self::Contact => "contact",
            Self::Date => "date",
            Self::Clear => "clear",
        }
    }

    fn parse(cmd: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == cmd)
    }
}

/// Interactive console driven by a [`TerminalProfile`].
pub struct Terminal<C = SystemClock> {
    profile: TerminalProfile,
    clock: C,
    history: Vec<String>,
}

impl Terminal<SystemClock> {
    pub fn new(profile: TerminalProfile) -> Self {
        Self::with_clock(profile, SystemClock)
    }
}

impl<C: Clock> Terminal<C> {
    pub fn with_clock(
        profile: TerminalProfile,
        clock: C,
    ) -> Self {
        Self {
            profile,
            clock,
            history: Vec::new(),
        }
    }

    pub fn profile(&self) -> &TerminalProfile {
        &self.profile
    }

    /// Lines echoed or printed since the last `clear`.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Banner printed when the console opens.
    pub fn banner(&self) -> String {
        format!(
            "{}\n{}\nType 'help' for available commands.",
            self.profile.prompt_title, self.profile.welcome
        )
    }

    /// Runs one command line.
    ///
    /// The line is echoed to the history with its original casing, then
    /// matched after trimming and lower-casing.
    pub fn execute(
        &mut self,
        line: &str,
    ) -> Response {
        let cmd = line.trim().to_lowercase();
        self.history.push(format!("{PROMPT} {line}"));

        let response = match Command::parse(&cmd) {
            Some(Command::Clear) => {
                self.history.clear();
                Response::Clear
            }
            Some(command) => Response::Text(self.answer(command)),
            None if cmd.is_empty() => Response::Empty,
            None => Response::NotFound(cmd.clone()),
        };

        if let Some(text) = response.render() {
            self.history.push(text);
        }
        debug!(command = %cmd, ?response, "terminal command");
        response
    }

    fn answer(
        &self,
        command: Command,
    ) -> String {
        match command {
            Command::Help => format!(
                "Available commands:\n  \
                 - about: Who is {}?\n  \
                 - skills: List technical arsenal\n  \
                 - contact: Get contact info\n  \
                 - clear: Clear terminal\n  \
                 - date: Show current system date",
                self.profile.name
            ),
            Command::About => self.profile.about.clone(),
            Command::Skills => {
                let mut text = String::from("Active Skills:");
                for skill in &self.profile.skills {
                    text.push_str("\n  [+] ");
                    text.push_str(skill);
                }
                text
            }
            Command::Contact => self.profile.contact.join("\n"),
            Command::Date => self
                .clock
                .now()
                .format("%a %b %d %Y %H:%M:%S GMT%z")
                .to_string(),
            Command::Clear => String::new(),
        }
    }

    /// Reads commands from `input` until end of stream, writing the banner,
    /// a prompt before each command and every response to `output`.
    pub fn run<R, W>(
        &mut self,
        input: R,
        mut output: W,
    ) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "{}", self.banner())?;
        write!(output, "{PROMPT} ")?;
        output.flush()?;

        for line in input.lines() {
            let response = self.execute(&line?);
            match response {
                Response::Clear => write!(output, "{CLEAR_SCREEN}")?,
                other => {
                    if let Some(text) = other.render() {
                        writeln!(output, "{text}")?;
                    }
                }
            }
            write!(output, "{PROMPT} ")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}
