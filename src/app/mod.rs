// Application layer - Use case interactors

pub mod container;
pub mod crop_interactor;
pub mod cut_interactor;
mod engine_run;
pub mod inspect_interactor;
pub mod stack_interactor;
pub mod verify_interactor;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer, JobOutput};
pub use crop_interactor::CropInteractor;
pub use cut_interactor::{CutInteractor, CutOutcome};
pub use inspect_interactor::InspectInteractor;
pub use stack_interactor::{StackInteractor, StackOutcome};
pub use verify_interactor::{VerifyInteractor, VerifyReport};
