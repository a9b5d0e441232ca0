use std::future::Future;
use std::pin::Pin;
use crate::tui::element::FocusId;

/// A boxed future resolving to an app message
pub type PendingMsg<Msg> = Pin<Box<dyn Future<Output = Msg> + Send>>;

/// Commands represent side effects that apps want to perform.
/// They are returned from the update() function and executed by the runtime.
pub enum Command<Msg> {
    /// Do nothing
    None,

    /// Execute multiple commands in sequence
    Batch(Vec<Command<Msg>>),

    /// Perform an async operation and send the result as a message
    Perform(PendingMsg<Msg>),

    /// Set focus to a specific element
    SetFocus(FocusId),

    /// Clear focus from all elements
    ClearFocus,

    /// Quit the application
    Quit,
}

impl<Msg> Command<Msg> {
    /// Helper to create a command that performs an async operation
    pub fn perform<F, T>(future: F, to_msg: impl Fn(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        Msg: Send + 'static,
    {
        Command::Perform(Box::pin(async move {
            let result = future.await;
            to_msg(result)
        }))
    }

    /// Helper to batch multiple commands
    pub fn batch(commands: Vec<Command<Msg>>) -> Self {
        Command::Batch(commands)
    }

    /// Helper to set focus to an element
    pub fn set_focus(id: FocusId) -> Self {
        Command::SetFocus(id)
    }

    /// Helper to clear focus from all elements
    pub fn clear_focus() -> Self {
        Command::ClearFocus
    }

    pub fn is_none(&self) -> bool {
        match self {
            Command::None => true,
            Command::Batch(commands) => commands.iter().all(Command::is_none),
            _ => false,
        }
    }

    pub fn is_quit(&self) -> bool {
        match self {
            Command::Quit => true,
            Command::Batch(commands) => commands.iter().any(Command::is_quit),
            _ => false,
        }
    }

    /// Flatten into the futures this command would spawn, in issue order.
    /// Lets callers other than the runtime decide when each one resolves.
    pub fn into_futures(self) -> Vec<PendingMsg<Msg>> {
        let mut futures = Vec::new();
        self.collect_futures(&mut futures);
        futures
    }

    fn collect_futures(self, out: &mut Vec<PendingMsg<Msg>>) {
        match self {
            Command::Perform(future) => out.push(future),
            Command::Batch(commands) => {
                for command in commands {
                    command.collect_futures(out);
                }
            }
            _ => {}
        }
    }
}

impl<Msg> Default for Command<Msg> {
    fn default() -> Self {
        Command::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_into_futures_flattens_batches() {
        let command: Command<u32> = Command::batch(vec![
            Command::perform(async { 1 }, |n| n),
            Command::None,
            Command::batch(vec![Command::perform(async { 2 }, |n| n * 10), Command::ClearFocus]),
        ]);
        assert!(!command.is_quit());

        let mut results = Vec::new();
        for future in command.into_futures() {
            results.push(future.await);
        }
        assert_eq!(results, vec![1, 20]);
    }

    #[test]
    fn test_quit_inside_batch() {
        let command: Command<()> = Command::batch(vec![Command::None, Command::Quit]);
        assert!(command.is_quit());
        assert!(Command::<()>::batch(vec![Command::None]).is_none());
    }
}
