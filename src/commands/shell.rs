//! Interactive shell handler
//!
//! A small read-eval-print loop over one capture at a time. `parse` loads a
//! file into the session; `blocks`, `responses` and `stats` inspect it.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Result;

use tzparse::{Capture, Config, DecodeOptions};

use super::{block_line, response_line, write_blocks};

const INDENT: &str = "    ";
const PROMPT: &str = "> ";

/// Whether the loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State kept between shell commands.
pub struct Session {
    options: DecodeOptions,
    capture: Option<Capture>,
}

impl Session {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            capture: None,
        }
    }

    /// Run one input line, writing its output to `out`.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "help" => write_help(out)?,
            "clear" => write!(out, "\x1b[2J\x1b[H")?,
            "parse" => self.parse(&args, out)?,
            "blocks" => self.blocks(out)?,
            "responses" => self.responses(&args, out)?,
            "stats" => self.stats(out)?,
            "exit" | "quit" => return Ok(Flow::Exit),
            _ => writeln!(
                out,
                "{}Unknown command. Type \"help\" to see full command list.",
                INDENT
            )?,
        }
        Ok(Flow::Continue)
    }

    fn parse<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<()> {
        let [path] = args else {
            writeln!(out, "{}Wrong arguments count.", INDENT)?;
            return Ok(());
        };
        if !Path::new(path).is_file() {
            writeln!(out, "{}File does not exist.", INDENT)?;
            return Ok(());
        }

        match Capture::open(path, &self.options) {
            Ok(capture) => {
                write_blocks(out, &capture, INDENT)?;
                for failure in &capture.failures {
                    writeln!(out, "{}! {}", INDENT, failure)?;
                }
                writeln!(out)?;
                self.capture = Some(capture);
            }
            Err(e) => writeln!(out, "{}{:#}", INDENT, e)?,
        }
        Ok(())
    }

    fn blocks<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(capture) = self.loaded(out)? else {
            return Ok(());
        };
        for block in &capture.blocks {
            writeln!(out, "{}{}", INDENT, block_line(block))?;
        }
        Ok(())
    }

    fn responses<W: Write>(&self, args: &[&str], out: &mut W) -> Result<()> {
        let Some(capture) = self.loaded(out)? else {
            return Ok(());
        };
        let selected = match args {
            [] => None,
            [index] => match index.parse::<usize>() {
                Ok(index) if index < capture.blocks.len() => Some(index),
                _ => {
                    writeln!(out, "{}No such block: {}", INDENT, index)?;
                    return Ok(());
                }
            },
            _ => {
                writeln!(out, "{}Wrong arguments count.", INDENT)?;
                return Ok(());
            }
        };

        for block in &capture.blocks {
            if selected.is_some_and(|index| index != block.index) {
                continue;
            }
            for response in &block.responses {
                writeln!(out, "{}{}", INDENT, response_line(block, response))?;
            }
        }
        Ok(())
    }

    fn stats<W: Write>(&self, out: &mut W) -> Result<()> {
        let Some(capture) = self.loaded(out)? else {
            return Ok(());
        };
        for line in capture.stats().summary().lines() {
            writeln!(out, "{}{}", INDENT, line)?;
        }
        Ok(())
    }

    fn loaded<W: Write>(&self, out: &mut W) -> Result<Option<&Capture>> {
        if self.capture.is_none() {
            writeln!(out, "{}No capture loaded. Use \"parse [filePath]\" first.", INDENT)?;
        }
        Ok(self.capture.as_ref())
    }
}

fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    let commands = [
        ("help", "Displays full list of commands."),
        ("clear", "Clears console."),
        ("parse [filePath]", "Parses file to blocks. Displays each block size."),
        ("blocks", "Lists the blocks of the parsed file."),
        ("responses [block]", "Lists decoded responses, optionally of one block."),
        ("stats", "Displays response counts per type and session duration."),
        ("exit", "Exits the program."),
    ];
    for (number, (usage, description)) in commands.iter().enumerate() {
        writeln!(out, "{}{}: {}", INDENT, number, usage)?;
        writeln!(out, "{}{}", INDENT, description)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Handle the shell command.
#[cfg(not(tarpaulin_include))]
pub fn handle() -> Result<()> {
    let config = Config::load()?;
    let mut session = Session::new(config.decode.options());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("Parser program is running. Type \"help\" to see full command list.");

    let mut input = String::new();
    loop {
        print!("{}", PROMPT);
        stdout.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        if session.execute(&input, &mut stdout)? == Flow::Exit {
            break;
        }
    }
    Ok(())
}
