//! Line-oriented command interpreter over a `SplayTree<i64, String>`.
//!
//! Tokens are whitespace separated and may span lines, so `in 5` on one
//! line and `five` on the next is a single insertion.
//!
//! ```text
//! in N S    insert record (N, S); duplicates allowed
//! up N S    give one record with key N the satellite S
//! er N      erase one record with key N
//! fi N      find key N and print its satellite
//! min, max  find and print the extreme record
//! prn       dump the tree in free-form text
//! dot       write the tree as a Graphviz DOT file
//! help      list the commands
//! x         exit
//! ```

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::tree::SplayTree;
use crate::types::{DriverError, SplayError, UpdateError};

pub const HELP_TEXT: &str = "\
Key:  N represents a decimal integer
      S represents a nonempty string not containing whitespace

in N S \tInsert record (N,S) into tree (as multiset).
up N S \tUpdate record with key N, now associating it with S.
er N   \tErase one record with key N from tree (if any).
fi N   \tFind key N once, print its associated string.
min    \tFind and print the minimum key in the tree.
max    \tFind and print the maximum key in the tree.
prn    \tPrint tree contents, in freeform human-readable format.
dot    \tWrite tree contents to file in DOT format -- see graphviz(1).
x      \tExit
help   \tShow this list of commands
";

/// Hands out numbered DOT file names.  The first name is one past the
/// starting number.
#[derive(Clone, Debug)]
pub struct DotNamer {
    dir: PathBuf,
    last: u32,
}

impl DotNamer {
    pub fn new<P: Into<PathBuf>>(dir: P, start: u32) -> Self {
        DotNamer {
            dir: dir.into(),
            last: start,
        }
    }

    pub fn next_path(&mut self) -> PathBuf {
        self.last += 1;
        self.dir.join(format!("tree{}.dot", self.last))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Whitespace tokenizer over a line reader.
pub struct Tokens<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    pub fn new(input: R) -> Self {
        Tokens {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> std::io::Result<Option<String>> {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return Ok(Some(tok));
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }
}

/// Whether the session should keep reading commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Session<W> {
    tree: SplayTree<i64, String>,
    out: W,
    namer: DotNamer,
    health_check: bool,
}

impl<W: Write> Session<W> {
    pub fn new(out: W, namer: DotNamer) -> Self {
        Session {
            tree: SplayTree::new(),
            out,
            namer,
            health_check: true,
        }
    }

    /// Turn the after-every-command health check on or off.
    pub fn with_health_check(mut self, on: bool) -> Self {
        self.health_check = on;
        self
    }

    pub fn tree(&self) -> &SplayTree<i64, String> {
        &self.tree
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run commands until `x` or end of input, then drain the tree.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<(), DriverError> {
        writeln!(self.out, "Enter 'help' for a list of commands.")?;
        let mut tokens = Tokens::new(input);

        let result = self.run_commands(&mut tokens);
        self.drain();
        result
    }

    fn run_commands<R: BufRead>(&mut self, tokens: &mut Tokens<R>) -> Result<(), DriverError> {
        while let Some(cmd) = tokens.next_token()? {
            if self.execute(&cmd, tokens)? == Flow::Exit {
                break;
            }
            if self.health_check {
                self.tree.health_check()?;
            }
        }
        Ok(())
    }

    /// Release every record, largest key first.
    fn drain(&mut self) {
        let mut drained = 0usize;
        while self.tree.pop_max().is_some() {
            drained += 1;
        }
        debug!(drained, "session tree drained");
    }

    /// Execute one command, pulling its arguments from `tokens`.
    pub fn execute<R: BufRead>(
        &mut self,
        cmd: &str,
        tokens: &mut Tokens<R>,
    ) -> Result<Flow, DriverError> {
        match cmd {
            "in" | "insert" => {
                let key = int_arg(cmd, tokens)?;
                let sat = string_arg(cmd, tokens)?;
                self.tree.insert(key, sat)?;
            }
            "up" | "update" => {
                let key = int_arg(cmd, tokens)?;
                let sat = string_arg(cmd, tokens)?;
                match self.tree.update(&key, sat) {
                    Ok(_) => {}
                    Err(UpdateError {
                        error: SplayError::NotFound,
                        ..
                    }) => writeln!(self.out, "Warning: update failed")?,
                    Err(e) => return Err(e.error.into()),
                }
            }
            "er" | "erase" => {
                let key = int_arg(cmd, tokens)?;
                match self.tree.erase(&key) {
                    Ok(_) => {}
                    Err(SplayError::NotFound) => writeln!(self.out, "Warning: erase failed")?,
                    Err(e) => return Err(e.into()),
                }
            }
            "fi" | "find" => {
                let key = int_arg(cmd, tokens)?;
                let found = self.tree.find(&key).map(|(k, s)| (*k, s.clone()));
                self.print_result(found)?;
            }
            "min" => {
                let found = self.tree.min().map(|(k, s)| (*k, s.clone()));
                self.print_result(found)?;
            }
            "max" => {
                let found = self.tree.max().map(|(k, s)| (*k, s.clone()));
                self.print_result(found)?;
            }
            "prn" | "print" => self.tree.write_debug(&mut self.out)?,
            "dot" | "export" => {
                let path = self.namer.next_path();
                writeln!(self.out, "Writing to file {}", path.display())?;
                self.tree.save_dot(&path)?;
            }
            "help" => write!(self.out, "{}", HELP_TEXT)?,
            "x" | "exit" => return Ok(Flow::Exit),
            other => {
                warn!(command = other, "unrecognized command");
                writeln!(self.out, "Warning: unrecognized command (enter 'help' for a list)")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn print_result(&mut self, found: Option<(i64, String)>) -> std::io::Result<()> {
        match found {
            Some((key, sat)) => writeln!(self.out, "present\nkey = {}, sat = {}", key, sat),
            None => writeln!(self.out, "absent"),
        }
    }
}

fn int_arg<R: BufRead>(cmd: &str, tokens: &mut Tokens<R>) -> Result<i64, DriverError> {
    tokens
        .next_token()?
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| DriverError::Syntax(format!("cannot scan integer argument for command {}", cmd)))
}

fn string_arg<R: BufRead>(cmd: &str, tokens: &mut Tokens<R>) -> Result<String, DriverError> {
    tokens
        .next_token()?
        .ok_or_else(|| DriverError::Syntax(format!("cannot scan string argument for command {}", cmd)))
}
