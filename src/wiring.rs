use std::io;
use std::os::fd::OwnedFd;

use nix::unistd::pipe;

use crate::command::Pipeline;

/// Where a stage's standard input comes from.
#[derive(Debug)]
pub enum ReadSource {
    File(String),
    Pipe(OwnedFd),
    Inherit,
}

/// Where a stage's standard output goes.
#[derive(Debug)]
pub enum WriteTarget {
    File(String),
    Pipe(OwnedFd),
    Inherit,
}

/// The descriptors one stage binds to its standard streams. Owning the
/// pipe ends means dropping a plan closes every end it holds, so the
/// parent's copies disappear as soon as the stage is launched.
#[derive(Debug)]
pub struct StagePlan {
    pub read: ReadSource,
    pub write: WriteTarget,
}

/// Compute the plan for stage `index`, allocating at most one new pipe.
///
/// `carry` holds the read end of the pipe feeding this stage (left there
/// by the previous call) and leaves behind the read end feeding the next
/// one. Pipes are allocated one link at a time, so only the active link's
/// descriptors are ever open at once.
pub fn plan_stage(
    pipeline: &Pipeline,
    index: usize,
    carry: &mut Option<OwnedFd>,
) -> io::Result<StagePlan> {
    let last = pipeline.stages.len() - 1;

    let read = if index == 0 {
        match &pipeline.input {
            Some(path) => ReadSource::File(path.clone()),
            None => ReadSource::Inherit,
        }
    } else {
        let upstream = carry
            .take()
            .expect("interior stage planned without its upstream pipe");
        ReadSource::Pipe(upstream)
    };

    let write = if index == last {
        match &pipeline.output {
            Some(path) => WriteTarget::File(path.clone()),
            None => WriteTarget::Inherit,
        }
    } else {
        let (read_end, write_end) = pipe().map_err(io::Error::from)?;
        *carry = Some(read_end);
        WriteTarget::Pipe(write_end)
    };

    Ok(StagePlan { read, write })
}
