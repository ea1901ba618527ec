//! Output buffers, checkpoints and the translator context stack.
//!
//! Out-of-order placement works by checkpoint and splice: a translator takes
//! a [`Checkpoint`] of the body buffer when it enters a construct (a header,
//! the document title), and on leave [`Buffer::splice`] removes everything
//! appended since and hands it back for relocation. Checkpoints are kept on
//! the [`ContextStack`], so nested and sequential constructs are spliced in
//! LIFO order and keep their document order in the destination.

use crate::error::{Error, Result};

/// Position in a [`Buffer`], taken with [`Buffer::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Checkpoint {
    pub fn position(self) -> usize {
        self.0
    }
}

/// Ordered sequence of output fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    fragments: Vec<String>,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn extend<I, S>(&mut self, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fragments.extend(fragments.into_iter().map(Into::into));
    }

    /// Insert a fragment before position `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, fragment: impl Into<String>) {
        let index = index.min(self.fragments.len());
        self.fragments.insert(index, fragment.into());
    }

    /// Replace the fragment at `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, fragment: impl Into<String>) {
        if let Some(slot) = self.fragments.get_mut(index) {
            *slot = fragment.into();
        }
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn pop(&mut self) -> Option<String> {
        self.fragments.pop()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.fragments.len())
    }

    /// Remove and return every fragment appended since `checkpoint`.
    ///
    /// A checkpoint beyond the current length means the buffer was truncated
    /// underneath it, which is a translator bug.
    pub fn splice(&mut self, checkpoint: Checkpoint) -> Result<Vec<String>> {
        if checkpoint.0 > self.fragments.len() {
            return Err(Error::Invariant(format!(
                "checkpoint {} beyond buffer length {}",
                checkpoint.0,
                self.fragments.len()
            )));
        }
        let spliced = self.fragments.split_off(checkpoint.0);
        log::trace!(
            "spliced {} fragments at checkpoint {}",
            spliced.len(),
            checkpoint.0
        );
        Ok(spliced)
    }

    /// Concatenate all fragments.
    pub fn join(&self) -> String {
        self.fragments.concat()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }
}

/// A frame pushed when entering a construct and popped on its leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Body checkpoint for out-of-order relocation.
    Splice(Checkpoint),
    /// Closing markup emitted on leave.
    Close(String),
    /// Nothing to emit on leave (keeps enter/leave paired).
    Empty,
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Splice(_) => "splice",
            Frame::Close(_) => "close",
            Frame::Empty => "empty",
        }
    }
}

/// Stack of per-construct frames.
///
/// Popping from an empty stack or popping a frame of the wrong kind means
/// enter and leave went out of step; both are fatal.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pop a checkpoint frame.
    pub fn pop_checkpoint(&mut self) -> Result<Checkpoint> {
        match self.pop_kind("splice")? {
            Frame::Splice(checkpoint) => Ok(checkpoint),
            other => Err(mismatch("splice", &other)),
        }
    }

    /// Pop a closing-markup frame (an `Empty` frame yields "").
    pub fn pop_close(&mut self) -> Result<String> {
        match self.frames.pop() {
            Some(Frame::Close(markup)) => Ok(markup),
            Some(Frame::Empty) => Ok(String::new()),
            Some(other) => {
                let err = mismatch("close", &other);
                self.frames.push(other);
                Err(err)
            }
            None => Err(Error::ContextUnderflow { expected: "close" }),
        }
    }

    fn pop_kind(&mut self, expected: &'static str) -> Result<Frame> {
        match self.frames.pop() {
            Some(frame) if frame.kind() == expected => Ok(frame),
            Some(frame) => {
                let err = mismatch(expected, &frame);
                self.frames.push(frame);
                Err(err)
            }
            None => Err(Error::ContextUnderflow { expected }),
        }
    }

    /// Fails if any frame is still open after a complete walk.
    pub fn ensure_empty(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Ok(());
        }
        let kinds: Vec<_> = self.frames.iter().map(Frame::kind).collect();
        Err(Error::Invariant(format!(
            "{} context frame(s) left open: {}",
            kinds.len(),
            kinds.join(", ")
        )))
    }
}

fn mismatch(expected: &'static str, found: &Frame) -> Error {
    Error::ContextMismatch {
        expected,
        found: found.kind(),
    }
}
