//! Library side of the `mpi` binary: logging setup and output writers.

pub mod logging;
pub mod output;
