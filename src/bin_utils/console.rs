use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Input closed")]
    Closed,
    #[error("Invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Prints `prompt` and returns the next line, trimmed.
    pub fn ask(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConsoleError::Closed);
        }
        Ok(line.trim().to_owned())
    }

    pub fn ask_parsed<T>(&mut self, prompt: &str, what: &'static str) -> Result<T, ConsoleError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let answer = self.ask(prompt)?;
        answer.parse().map_err(|err: T::Err| ConsoleError::Invalid {
            what,
            reason: err.to_string(),
        })
    }
}
