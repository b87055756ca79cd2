//! Database entities.

pub mod activation_code;
pub mod client;
pub mod contact;
pub mod deal;
pub mod lead;
pub mod lead_stage;
pub mod location;
pub mod pipeline;
pub mod stage;
pub mod tier;
pub mod user;

pub use activation_code::Entity as ActivationCode;
pub use client::Entity as Client;
pub use contact::Entity as Contact;
pub use deal::Entity as Deal;
pub use lead::Entity as Lead;
pub use lead_stage::Entity as LeadStage;
pub use location::Entity as Location;
pub use pipeline::Entity as Pipeline;
pub use stage::Entity as Stage;
pub use tier::Entity as Tier;
pub use user::Entity as User;
