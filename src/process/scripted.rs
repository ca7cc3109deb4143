//! A [`CommandRunner`] that replays canned responses.

use std::io;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CommandOutput, CommandRunner};

/// Exit code returned for commands nobody scripted.
pub const UNSCRIPTED_EXIT_CODE: i32 = 127;

struct Expectation {
    command: Vec<String>,
    response: io::Result<CommandOutput>,
}

/// Fake runner keyed by the full command line (`program` followed by `args`).
///
/// Responses registered for the same command line are consumed in order; the
/// last one keeps answering once the queue is drained. Unscripted commands
/// answer with exit code [`UNSCRIPTED_EXIT_CODE`] so tests fail loudly.
#[derive(Default)]
pub struct ScriptedRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<Vec<String>>>,
    missing: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `output`.
    pub fn on(self, command: &[&str], output: CommandOutput) -> Self {
        self.push(command, Ok(output));
        self
    }

    /// Answer `command` with a spawn failure.
    pub fn on_spawn_error(self, command: &[&str], kind: io::ErrorKind) -> Self {
        self.push(command, Err(io::Error::new(kind, "scripted spawn failure")));
        self
    }

    /// Report `program` as absent from the search path.
    pub fn without_program(self, program: &str) -> Self {
        lock(&self.missing).push(program.to_string());
        self
    }

    /// Every command line received so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        lock(&self.calls).clone()
    }

    /// Whether `command` was run at least once.
    pub fn was_called(&self, command: &[&str]) -> bool {
        lock(&self.calls)
            .iter()
            .any(|call| call.iter().map(String::as_str).eq(command.iter().copied()))
    }

    /// Whether any call started with `prefix`.
    pub fn was_called_with_prefix(&self, prefix: &[&str]) -> bool {
        lock(&self.calls).iter().any(|call| {
            call.len() >= prefix.len()
                && call.iter().zip(prefix).all(|(a, b)| a == b)
        })
    }

    fn push(&self, command: &[&str], response: io::Result<CommandOutput>) {
        lock(&self.expectations).push(Expectation {
            command: command.iter().map(|s| s.to_string()).collect(),
            response,
        });
    }

    fn respond(&self, line: &[String]) -> io::Result<CommandOutput> {
        let mut expectations = lock(&self.expectations);
        let matching: Vec<usize> = expectations
            .iter()
            .enumerate()
            .filter(|(_, e)| e.command == line)
            .map(|(i, _)| i)
            .collect();

        match matching.as_slice() {
            [] => Ok(CommandOutput::failure(
                UNSCRIPTED_EXIT_CODE,
                format!("unscripted command: {}", line.join(" ")),
            )),
            [only] => clone_response(&expectations[*only].response),
            [first, ..] => {
                let expectation = expectations.remove(*first);
                expectation.response
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let mut line = vec![program.to_string()];
        line.extend(args.iter().map(|a| a.to_string()));
        lock(&self.calls).push(line.clone());
        self.respond(&line)
    }

    fn is_installed(&self, program: &str) -> bool {
        !lock(&self.missing).iter().any(|p| p == program)
    }
}

fn clone_response(response: &io::Result<CommandOutput>) -> io::Result<CommandOutput> {
    match response {
        Ok(output) => Ok(output.clone()),
        Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
