//! The [`Task`] value and its combinators.

use futures::future::{self, BoxFuture, FutureExt};
use std::convert::Infallible;
use std::fmt;
use std::future::{Future, IntoFuture};

type Thunk<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;

/// A deferred computation that fails with `E` or succeeds with `T`.
///
/// A task holds a thunk that produces its future on demand. Building and
/// composing tasks never polls anything; the work starts only when the task
/// is consumed by [`Task::run`], [`Task::fork`], or `.await`. A task runs at
/// most once because running consumes it.
#[must_use = "tasks do nothing unless they are run"]
pub struct Task<T, E> {
    thunk: Thunk<T, E>,
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates a task from a thunk that builds the future to execute.
    ///
    /// The thunk is not called until the task is run.
    pub fn new<F, Fut>(thunk: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            thunk: Box::new(move || thunk().boxed()),
        }
    }

    /// Creates a task that succeeds with `value`.
    pub fn of(value: T) -> Self {
        Self::new(move || future::ready(Ok(value)))
    }

    /// Creates a task that fails with `error`.
    pub fn rejected(error: E) -> Self {
        Self::new(move || future::ready(Err(error)))
    }

    /// Transforms the success value.
    pub fn map<U, F>(self, f: F) -> Task<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let thunk = self.thunk;
        Task::new(move || async move { thunk().await.map(f) })
    }

    /// Transforms the failure value.
    pub fn map_err<G, F>(self, f: F) -> Task<T, G>
    where
        G: Send + 'static,
        F: FnOnce(E) -> G + Send + 'static,
    {
        let thunk = self.thunk;
        Task::new(move || async move { thunk().await.map_err(f) })
    }

    /// Sequences a dependent task after this one succeeds.
    ///
    /// A failure short-circuits: `f` is never called and the error is
    /// carried through unchanged.
    pub fn chain<U, F>(self, f: F) -> Task<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Task<U, E> + Send + 'static,
    {
        let thunk = self.thunk;
        Task::new(move || async move {
            let value = thunk().await?;
            f(value).run().await
        })
    }

    /// Recovers from a failure with another task.
    pub fn or_else<G, F>(self, f: F) -> Task<T, G>
    where
        G: Send + 'static,
        F: FnOnce(E) -> Task<T, G> + Send + 'static,
    {
        let thunk = self.thunk;
        Task::new(move || async move {
            match thunk().await {
                Ok(value) => Ok(value),
                Err(error) => f(error).run().await,
            }
        })
    }

    /// Runs `release` after this task on both the success and failure path.
    ///
    /// The outcome of this task is returned unchanged once `release` has
    /// completed.
    pub fn finally<F>(self, release: F) -> Self
    where
        F: FnOnce() -> Task<(), Infallible> + Send + 'static,
    {
        let thunk = self.thunk;
        Self::new(move || async move {
            let outcome = thunk().await;
            release().resolve().await;
            outcome
        })
    }

    /// Acquires a resource, uses it, and releases it on every exit path.
    ///
    /// `release` runs whenever `acquire` succeeded, whether `use_resource`
    /// then succeeds or fails. When `acquire` fails there is nothing to
    /// release and its error is returned directly.
    pub fn bracket<R, U, F>(acquire: Task<R, E>, use_resource: U, release: F) -> Self
    where
        R: Clone + Send + 'static,
        U: FnOnce(R) -> Self + Send + 'static,
        F: FnOnce(R) -> Task<(), Infallible> + Send + 'static,
    {
        acquire.chain(move |resource| {
            let held = resource.clone();
            use_resource(resource).finally(move || release(held))
        })
    }

    /// Executes the task and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the task's failure value when any step of the composed
    /// computation fails.
    pub async fn run(self) -> Result<T, E> {
        (self.thunk)().await
    }

    /// Executes the task, handing the outcome to exactly one callback.
    pub async fn fork<R, S>(self, on_reject: R, on_resolve: S)
    where
        R: FnOnce(E),
        S: FnOnce(T),
    {
        match self.run().await {
            Ok(value) => on_resolve(value),
            Err(error) => on_reject(error),
        }
    }
}

impl<T> Task<T, Infallible>
where
    T: Send + 'static,
{
    /// Executes a task that cannot fail and returns its value.
    pub async fn resolve(self) -> T {
        let Ok(value) = self.run().await;
        value
    }

    /// Re-types a task that cannot fail so it composes with fallible tasks.
    pub fn widen<E>(self) -> Task<T, E>
    where
        E: Send + 'static,
    {
        self.map_err(|never| match never {})
    }
}

impl<T, E> IntoFuture for Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        (self.thunk)()
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
