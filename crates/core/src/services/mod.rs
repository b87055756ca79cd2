//! Business logic services.

pub mod activation_code;
pub mod client;
pub mod contact;
pub mod deal;
pub mod lead;
pub mod location;
pub mod pipeline;
pub mod tier;
pub mod user;

pub use activation_code::{ActivationCodeService, GenerateCodesInput};
pub use client::{ClientService, CreateClientInput, UpdateClientInput};
pub use contact::{ContactService, CreateContactInput, UpdateContactInput};
pub use deal::{CreateDealInput, DealService};
pub use lead::{CreateLeadInput, LeadService};
pub use location::{CreateLocationInput, LocationService};
pub use pipeline::{CreatePipelineInput, CreateStageInput, PipelineService};
pub use tier::{CreateTierInput, TierService};
pub use user::{CreateUserInput, UserService};
