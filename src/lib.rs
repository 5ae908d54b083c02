extern crate chrono;
extern crate copperline;
extern crate itertools;
extern crate log;
extern crate thiserror;

pub mod vector;

use std::fmt;
use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDate};
use itertools::Itertools;
use log::{debug, warn};
use thiserror::Error;

pub const PROMPT: &str = ">> ";
pub const WELCOME: &str = "Welcome to the command loop.";
pub const QUIT_HINT: &str =
    "Press Ctrl-C Ctrl-C to quit for the terminal or Ctrl-D from the REPL.";
pub const HELP_MESSAGE: &str = "Here are the available commands: \n help \n time \n dotproduct";
pub const UNRECOGNIZED: &str = "Command not recognized. ";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error("malformed vector input: {0}")]
    MalformedVectorInput(String),

    #[error("dimension mismatch: left has {left} elements, right has {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("dot product is not representable as a finite number")]
    Overflow,

    #[error("input line is not valid UTF-8")]
    InvalidUtf8,

    #[error("input closed")]
    InputClosed,

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A line split into its command name and the remaining tokens.
#[derive(Debug, PartialEq)]
pub enum Command<'a> {
    Help,
    Time,
    DotProduct { args: Vec<&'a str> },
    Unrecognized(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Command<'a> {
        let mut tokens = line.split_whitespace();

        match tokens.next().unwrap_or("") {
            "help" => Command::Help,
            "time" => Command::Time,
            "dotproduct" => Command::DotProduct {
                args: tokens.collect(),
            },
            name => Command::Unrecognized(name),
        }
    }
}

/// The outcome of evaluating a single line.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Help,
    Date(NaiveDate),
    Number(f64),
    Unrecognized,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Response::Help => f.write_str(HELP_MESSAGE),
            Response::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Response::Number(x) => write!(f, "{}", x),
            Response::Unrecognized => write!(f, "{}{}", UNRECOGNIZED, HELP_MESSAGE),
        }
    }
}

/// Evaluate one input line. The first matching command wins.
pub fn eval(line: &str) -> Result<Response, ReplError> {
    match Command::parse(line) {
        Command::Help => Ok(Response::Help),

        Command::Time => Ok(Response::Date(Local::now().date_naive())),

        Command::DotProduct { args } => {
            // Only the first two arguments are considered.
            let (lhs, rhs) = args.into_iter().next_tuple().ok_or_else(|| {
                ReplError::MalformedVectorInput(
                    "dotproduct expects two vectors, e.g. `dotproduct [1,2] [3,4]`".to_string(),
                )
            })?;

            let lhs = vector::parse_vector(lhs)?;
            let rhs = vector::parse_vector(rhs)?;
            Ok(Response::Number(vector::dot(&lhs, &rhs)?))
        }

        Command::Unrecognized(name) => {
            debug!("unrecognized command {:?}", name);
            Ok(Response::Unrecognized)
        }
    }
}

/// Somewhere input lines come from.
pub trait LineSource {
    /// Read one line, without its terminator, after showing `prompt`.
    ///
    /// Returns `ReplError::InputClosed` once no more input is available.
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<String, ReplError>;
}

/// A plain buffered reader. Writes the prompt itself.
pub struct StreamSource<R> {
    reader: R,
}

impl<R: BufRead> StreamSource<R> {
    pub fn new(reader: R) -> StreamSource<R> {
        StreamSource { reader }
    }
}

impl<R: BufRead> LineSource for StreamSource<R> {
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write) -> Result<String, ReplError> {
        out.write_all(prompt.as_bytes())?;
        out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(ReplError::InputClosed);
        }

        let mut line = String::from_utf8_lossy(&buf).into_owned();

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(line)
    }
}

/// The interactive line editor draws its own prompt. Lines are never added
/// to its history.
impl LineSource for copperline::Copperline {
    fn read_line(&mut self, prompt: &str, _out: &mut dyn Write) -> Result<String, ReplError> {
        match self.read_line_utf8(prompt) {
            Ok(line) => Ok(line),
            Err(copperline::Error::InvalidUTF8) => Err(ReplError::InvalidUtf8),
            Err(_) => Err(ReplError::InputClosed),
        }
    }
}

pub struct CommandLoop<S, W> {
    source: S,
    output: W,
}

impl<S: LineSource, W: Write> CommandLoop<S, W> {
    pub fn new(source: S, output: W) -> CommandLoop<S, W> {
        CommandLoop { source, output }
    }

    /// Print the welcome line and the quit hint.
    pub fn banner(&mut self) -> Result<(), ReplError> {
        writeln!(self.output, "{}", WELCOME)?;
        writeln!(self.output, "{}", QUIT_HINT)?;
        self.output.flush()?;
        Ok(())
    }

    /// Read, evaluate and print a single line.
    ///
    /// Evaluation errors and undecodable lines are printed and swallowed;
    /// only `InputClosed` and output failures are returned.
    pub fn step(&mut self) -> Result<(), ReplError> {
        let line = match self.source.read_line(PROMPT, &mut self.output) {
            Ok(line) => line,
            Err(ReplError::InvalidUtf8) => {
                warn!("skipping undecodable input line");
                writeln!(self.output, "{}", ReplError::InvalidUtf8)?;
                self.output.flush()?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        debug!("read line {:?}", line);

        match eval(&line) {
            Ok(response) => writeln!(self.output, "{}", response)?,
            Err(err) => {
                warn!("evaluation failed: {}", err);
                writeln!(self.output, "{}", err)?;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    /// Print the banner, then step until the input is exhausted.
    pub fn run(&mut self) -> Result<(), ReplError> {
        self.banner()?;

        loop {
            match self.step() {
                Ok(()) => {}
                Err(ReplError::InputClosed) => {
                    debug!("input closed, leaving loop");
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
