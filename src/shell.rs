use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::executor;
use crate::jobs::JobTable;
use crate::parser;
use crate::prompt::Prompt;

pub struct Shell {
    prompt: Prompt,
    jobs: JobTable,
}

impl Shell {
    pub fn new() -> Self {
        Self {
            prompt: Prompt::new(),
            jobs: JobTable::new(),
        }
    }

    /// The interactive loop: prompt, read, reap, dispatch. Returns Ok
    /// when the input stream closes.
    pub fn run(&mut self) -> io::Result<()> {
        // ignore Ctrl+C in the shell process itself
        #[cfg(unix)]
        unsafe {
            use libc::{signal, SIGINT, SIG_IGN};
            signal(SIGINT, SIG_IGN);
        }

        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            print!("{}", self.prompt.get_string());
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!("exit");
                return Ok(());
            }

            let pipeline = parser::parse(&line);

            // always reap first so termination notices show up promptly,
            // even when the line itself was garbage
            for record in self.jobs.reap_finished() {
                println!("{:>8} : {} terminated", record.pid, record.name);
            }

            if let Some(message) = &pipeline.error {
                eprintln!("{}", format!("syntax error: {}", message).red());
                continue;
            }

            if pipeline.stages.is_empty() {
                continue;
            }

            if pipeline.stages[0][0] == "jobs" {
                self.list_jobs();
            } else if let Err(e) = executor::run_pipeline(&pipeline, &mut self.jobs) {
                eprintln!("{}", format!("pipesh: {}", e).red());
            }
        }
    }

    fn list_jobs(&self) {
        println!("Current jobs:");
        for record in self.jobs.list() {
            println!("{:>8} : {}", record.pid, record.name);
        }
    }
}
