use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Something a menu item or shortcut asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenFile,
    Save,
    Exit,
    CopyOffset,
    CopyHex,
    SelectAll,
    GoToStart,
    GoToEnd,
    ToggleDarkMode,
    SetBytesPerLine(usize),
    ShowOptions,
    About,
}

/// Queue shared between menu callbacks and the code that drains them.
///
/// Callbacks only enqueue, so running one never re-enters the state that
/// owns the menu.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Rc<RefCell<VecDeque<Command>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        CommandQueue::default()
    }

    pub fn push(&self, command: Command) {
        self.inner.borrow_mut().push_back(command);
    }

    /// A menu callback that enqueues `command`.
    pub fn sender(&self, command: Command) -> impl FnMut() + 'static {
        let queue = self.clone();
        move || queue.push(command)
    }

    pub fn drain(&self) -> Vec<Command> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}
