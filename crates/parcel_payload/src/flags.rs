use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Launch flags accumulated on a [`Payload`](crate::Payload).
    ///
    /// Flags are additive: adding a flag never clears one added before.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LaunchFlags: u32 {
        /// Start the target as the root of a new task.
        const NEW_TASK         = 1 << 0;
        /// Clear the existing task before the target starts.
        const CLEAR_TASK       = 1 << 1;
        /// Finish every host above an existing target instance.
        const CLEAR_TOP        = 1 << 2;
        /// Reuse the target if it already is on top.
        const SINGLE_TOP       = 1 << 3;
        /// Do not keep the target in history once it is left.
        const NO_HISTORY       = 1 << 4;
        const NO_ANIMATION     = 1 << 5;
        const REORDER_TO_FRONT = 1 << 6;
    }
}
