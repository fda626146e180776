//! A chess engine for generalized boards and extended piece sets.
//!
//! The engine layers a plain depth-limited minimax analyzer over the rules of the `chess` crate:
//! boards of 3 to 127 ranks and files, the Capablanca-style compound pieces, and X-FEN
//! persistence. See [`analyzer`](analyzer/index.html) for the search, and
//! [`event`](event/index.html) for the record handed to user-interface collaborators.
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]

pub mod analyzer;
pub mod event;

pub use analyzer::{Analyzer, Minimax, MovePrediction, ParallelMinimax};
pub use event::MoveEvent;
