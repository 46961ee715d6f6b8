//! Drives `diskpart` over a pipe to attach or detach the drive letter of a
//! disk partition that is identified by ordinal and exact capacity.

mod error;
mod helper;
mod machine;
pub mod matcher;
mod selector;
mod session;
pub mod step;
mod transcript;

pub use self::{
    error::StepError,
    helper::{HelperLauncher, ShellLauncher},
    machine::{Machine, ProtocolState},
    selector::{Action, DriveLetter, SelectorParseError, Target, VolumeSelector},
    session::{DEFAULT_TIMEOUT, Session, SessionConfig, SessionError, SessionOutcome, ToolCommand},
    transcript::{PROMPT, Transcript},
};
