//! Tests the minimax analyzers end to end
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////

use chess::Board;
use capablanca::analyzer::{Analyzer, Minimax, ParallelMinimax};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const SCHOLARS_MATE: &str = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
const FORCED_CAPTURE: &str = "4k3/8/8/3q4/8/8/8/3QK3 w - - 0 1";

fn board(xfen: &str) -> Board {
    xfen.parse().expect("valid xfen")
}

#[test]
fn a_depth_below_one_is_rejected() {
    assert!(Minimax::new().predict_moves(&board(START), 0).is_err());
    assert!(ParallelMinimax::new().predict_moves(&board(START), 0).is_err());
}

#[test]
fn the_start_position_yields_a_single_quiet_move_at_depth_1() {
    let prediction = Minimax::new().predict_moves(&board(START), 1).unwrap();

    assert_eq!(prediction.moves().len(), 1);
    assert_eq!(prediction.move_count(), 1);
    let first = prediction.moves()[0].as_ref().expect("a predicted move");
    assert_eq!(first.len(), 2);
    // nothing can be captured on the first move, so ratings stay in pawn range
    assert!(prediction.rating().abs() < 1000);
}

#[test]
fn a_mated_side_reports_the_loss_with_a_null_move_list() {
    // white just delivered the scholar's mate; every black move loses the king next ply
    let prediction = Minimax::new().predict_moves(&board(SCHOLARS_MATE), 1).unwrap();
    assert_eq!(prediction.rating(), Board::WIN);
    assert_eq!(prediction.moves(), &[None]);
    assert_eq!(prediction.move_count(), 0);

    let prediction = Minimax::new().predict_moves(&board(SCHOLARS_MATE), 2).unwrap();
    assert_eq!(prediction.rating(), Board::WIN);
    assert_eq!(prediction.moves(), &[None, None]);
}

#[test]
fn a_hanging_queen_is_taken() {
    let prediction = Minimax::new().predict_moves(&board(FORCED_CAPTURE), 1).unwrap();
    assert_eq!(prediction.moves()[0], Some(vec![3, 35])); // Qd1 takes d5
    assert_eq!(prediction.rating(), 880);

    let prediction = Minimax::new().predict_moves(&board(FORCED_CAPTURE), 2).unwrap();
    assert_eq!(prediction.moves()[0], Some(vec![3, 35]));
    assert_eq!(prediction.moves().len(), 2);
    assert_eq!(prediction.rating(), 880);
}

#[test]
fn a_stalemated_side_reports_the_draw() {
    // black to move has no legal move and is not in check
    let prediction = Minimax::new()
        .predict_moves(&board("7k/5Q2/8/8/8/8/8/6K1 b - - 0 1"), 2)
        .unwrap();
    assert_eq!(prediction.rating(), Board::DRAW);
    assert_eq!(prediction.moves(), &[None, None]);
}

#[test]
fn the_parallel_analyzer_agrees_with_the_sequential_one() {
    let sequential = Minimax::new();
    let parallel = ParallelMinimax::new();

    for depth in 1..=2 {
        let left = sequential.predict_moves(&board(SCHOLARS_MATE), depth).unwrap();
        let right = parallel.predict_moves(&board(SCHOLARS_MATE), depth).unwrap();
        assert_eq!(left.rating(), right.rating());
        assert_eq!(left.moves(), right.moves());

        let left = sequential.predict_moves(&board(FORCED_CAPTURE), depth).unwrap();
        let right = parallel.predict_moves(&board(FORCED_CAPTURE), depth).unwrap();
        assert_eq!(left.rating(), right.rating());
        assert_eq!(left.moves()[0], right.moves()[0]);
    }
}

#[test]
fn deeper_searches_keep_the_move_list_at_the_requested_depth() {
    let prediction = Minimax::new().predict_moves(&board(START), 3).unwrap();
    assert_eq!(prediction.moves().len(), 3);
    assert_eq!(prediction.move_count(), 3);
}
