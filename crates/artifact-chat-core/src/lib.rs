pub mod artifact;
pub mod command;
pub mod config;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod transition;

// Re-export main types for convenience
pub use artifact::{classify, Artifact, ArtifactContent, ArtifactKind, ArtifactLibrary};
pub use command::{CommandEffect, CommandId, SlashCommand};
pub use config::Config;
pub use scheduler::{Scheduler, TaskId, VirtualClock};
pub use session::{ChatSession, Timings};
pub use state::{Composer, Message, Panel, Sender, SessionState};
pub use transition::{Effect, Event, Timer};
