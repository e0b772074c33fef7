//! Per-guild audio playback coordination for chat bots.
//!
//! Each guild gets one [`player::session::PlayerSession`] holding its
//! current track, queue, history and resume bookkeeping; the
//! [`player::system::AudioService`] facade maps bot commands onto sessions
//! and publishes [`event::Event`] notifications for the render bridge.
//! Search, decoding and voice transport stay behind the traits in
//! [`player::traits`].

pub mod event;
pub mod player;
pub mod util;
