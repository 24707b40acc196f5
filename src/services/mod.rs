//! Business logic services.
//!
//! Services sit between HTTP handlers and the balance store. They validate
//! requests and apply deadlines; storage details stay behind the store trait.

pub mod wallet_service;
