//! Repository layer.
//!
//! One repository per aggregate, each holding a shared database connection
//! and translating `DbErr` into [`crm_common::AppError`].

mod activation_code;
mod client;
mod contact;
mod deal;
mod lead;
mod location;
mod pipeline;
mod tier;
mod user;

pub use activation_code::{ActivationCodeRepository, NewActivationCode};
pub use client::{ClientChanges, ClientRepository, NewClient};
pub use contact::{ContactChanges, ContactRepository, NewContact};
pub use deal::{DealRepository, NewDeal};
pub use lead::{LeadRepository, NewLead};
pub use location::{LocationRepository, DEPTH_CITY, DEPTH_COUNTRY, DEPTH_GOVERNORATE};
pub use pipeline::{NewPipeline, NewStage, PipelineRepository};
pub use tier::{NewTier, TierRepository};
pub use user::{NewUser, UserRepository};
