use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::OwnedFd;
use std::process;

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{dup2_stdin, dup2_stdout, execvp, fork, ForkResult, Pid};

use crate::command::Pipeline;
use crate::jobs::JobTable;
use crate::wiring::{plan_stage, ReadSource, StagePlan, WriteTarget};

/// Fork one process per stage, wired together by the per-stage plans.
///
/// Foreground pipelines block until the last stage exits; background
/// pipelines record the last stage's pid in the job table and return at
/// once. Earlier stages are never waited on here, the non-blocking reap
/// at the top of the loop collects them.
pub fn run_pipeline(pipeline: &Pipeline, jobs: &mut JobTable) -> io::Result<()> {
    if pipeline.stages.is_empty() {
        return Ok(());
    }

    let mut carry: Option<OwnedFd> = None;
    let mut last_pid: Option<Pid> = None;

    for (index, stage) in pipeline.stages.iter().enumerate() {
        let plan = plan_stage(pipeline, index, &mut carry)?;

        match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                // this child must not hold the read end feeding the next
                // stage, or that stage never sees end-of-stream
                drop(carry.take());
                exec_stage(stage, plan);
            }
            Ok(ForkResult::Parent { child }) => {
                // closes the parent's copies of this stage's pipe ends
                drop(plan);
                last_pid = Some(child);
            }
            Err(e) => {
                eprintln!("pipesh: cannot fork: {}", e);
                drop(plan);
            }
        }
    }

    match last_pid {
        Some(pid) if pipeline.background => {
            jobs.insert(pid, &pipeline.stages[0][0]);
        }
        Some(pid) => {
            if let Err(e) = waitpid(pid, None) {
                // already collected through the shared reap path
                if e != Errno::ECHILD {
                    return Err(io::Error::from(e));
                }
            }
        }
        None => {}
    }

    Ok(())
}

/// Child-side half of a launch: bind the planned descriptors to the
/// standard streams, then replace this process with the stage program.
/// Never returns to shell logic; every failure path exits the child.
fn exec_stage(stage: &[String], plan: StagePlan) -> ! {
    if let Err(e) = apply_plan(plan) {
        eprintln!("pipesh: {}", e);
        process::exit(1);
    }

    let argv: Vec<CString> = match stage
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(argv) => argv,
        Err(_) => {
            eprintln!("pipesh: argument contains a NUL byte");
            process::exit(1);
        }
    };

    let err = execvp(&argv[0], &argv).unwrap_err();
    eprintln!("{}: {}", stage[0], err);
    process::exit(127);
}

/// Duplicate the plan's descriptors onto stdin/stdout. The originals are
/// dropped (closed) as each arm finishes, so after this returns the only
/// copies left are the standard streams themselves.
fn apply_plan(plan: StagePlan) -> io::Result<()> {
    match plan.read {
        ReadSource::File(path) => {
            let file = File::open(&path)
                .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path, e)))?;
            dup2_stdin(&file)?;
        }
        ReadSource::Pipe(fd) => {
            dup2_stdin(&fd)?;
        }
        ReadSource::Inherit => {}
    }

    match plan.write {
        WriteTarget::File(path) => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)
                .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path, e)))?;
            dup2_stdout(&file)?;
        }
        WriteTarget::Pipe(fd) => {
            dup2_stdout(&fd)?;
        }
        WriteTarget::Inherit => {}
    }

    Ok(())
}
