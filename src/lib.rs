//! ENTITIES Storefront
//!
//! Streetwear storefront with WhatsApp checkout handoff.
//!
//! ## Features
//! - Product catalog and product pages
//! - Cookie-backed wishlist
//! - Single-product checkout ending in a WhatsApp conversation
//! - Admin dashboard, product and blog forms, media library
//! - AI-assisted blog drafting

pub mod ai;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod publisher;
pub mod repository;
pub mod saga;
pub mod services;
pub mod state;
pub mod storage;
pub mod web;
pub mod wishlist;

#[cfg(test)]
mod testing;
