// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Corduroy: music theory for guitar chord charts.
//!
//! - [`music`]: pitch classes, chord names, transposition and capo charts,
//!   diatonic keys, scales and fretboard positions
//! - [`library`]: custom chord voicings, the jam workspace and saved jams
//! - [`store`]: persistent collections with change notification
//! - [`exchange`]: JSON import and export
//! - [`config`]: user settings

pub mod config;
pub mod exchange;
pub mod library;
pub mod logging;
pub mod music;
pub mod store;
