//! Scripted transport for driving workflows without a git binary

use async_trait::async_trait;
use git_fleet::git::{CommandOutcome, ExitStatus, Transport};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub fn ok(output: &str) -> CommandOutcome {
    CommandOutcome {
        status: ExitStatus::Exited(0),
        output: output.to_string(),
    }
}

pub fn failed(code: i32, output: &str) -> CommandOutcome {
    CommandOutcome {
        status: ExitStatus::Exited(code),
        output: output.to_string(),
    }
}

pub fn timed_out(secs: u64) -> CommandOutcome {
    CommandOutcome {
        status: ExitStatus::Timeout,
        output: format!("Timeout ({secs}s)"),
    }
}

/// A [`Transport`] fake that answers commands from scripted rules and
/// records every invocation.
///
/// A rule matches when its pattern occurs in `<workdir> :: <args>`, so a
/// pattern can be scoped to one repository or match an argument sequence
/// across all of them. Outcomes queued for the same pattern are returned
/// in order, the last one repeating. Unscripted commands succeed with
/// empty output.
#[derive(Default)]
pub struct ScriptedTransport {
    rules: Mutex<Vec<(String, VecDeque<CommandOutcome>)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, pattern: &str, outcome: CommandOutcome) {
        let mut rules = self.rules.lock().unwrap();
        if let Some((_, queue)) = rules.iter_mut().find(|(p, _)| p == pattern) {
            queue.push_back(outcome);
        } else {
            rules.push((pattern.to_string(), VecDeque::from([outcome])));
        }
    }

    /// Every call as `<workdir> :: <args>`, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn run(&self, workdir: &Path, args: &[String], _timeout: Duration) -> CommandOutcome {
        let haystack = format!("{} :: {}", workdir.display(), args.join(" "));
        self.calls.lock().unwrap().push(haystack.clone());

        let mut rules = self.rules.lock().unwrap();
        for (pattern, queue) in rules.iter_mut() {
            if haystack.contains(pattern.as_str()) {
                return if queue.len() > 1 {
                    queue.pop_front().expect("queue checked non-empty")
                } else {
                    queue.front().cloned().expect("rules are created non-empty")
                };
            }
        }
        ok("")
    }
}
