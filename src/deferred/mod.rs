//! Deferred computations that run only when explicitly executed.
//!
//! A [`Task`] describes work without starting it. Composing tasks with
//! [`Task::map`], [`Task::chain`], or [`Task::bracket`] builds a larger
//! description; nothing touches the network until the outermost task is
//! run with [`Task::run`], [`Task::fork`], or `.await`.

mod task;

pub use task::Task;
