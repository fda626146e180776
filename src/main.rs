//! The capablanca chess engine.
//
//  Copyright 2026 The capablanca developers
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]

use std::fs::File;
use std::path::PathBuf;
use clap::{App, AppSettings, Arg, SubCommand, crate_version};
use simplelog::{WriteLogger, LevelFilter, Config};
use chess::{position_name, variations, Board};
use capablanca::analyzer::{Analyzer, Minimax, MovePrediction, ParallelMinimax};

const START_XFEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn main() -> Result<(), Error> {
    let matches =
        App::new("Capablanca")
            .version(crate_version!())
            .setting(AppSettings::SubcommandRequiredElseHelp)
            .arg(Arg::with_name("log")
                .long("log")
                .short("l")
                .global(true)
                .help("Turns on logging"))
            .arg(Arg::with_name("log-file")
                .long("log-file")
                .global(true)
                .value_name("LOG_FILE")
                .takes_value(true)
                .default_value("capablanca.log")
                .help("Sets the log file if logging is turned on"))
            .arg(Arg::with_name("log-level")
                .long("log-level")
                .global(true)
                .value_name("LEVEL")
                .takes_value(true)
                .default_value("info")
                .help("Sets the log level if logging is turned on"))
            .subcommand(SubCommand::with_name("predict")
                .about("Predicts the best sequence of half moves for a given position. \
                        Defaults to the\nstandard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .default_value("4")
                    .help("Search depth in half moves"))
                .arg(Arg::with_name("parallel")
                    .long("parallel")
                    .short("p")
                    .help("Fans the first search ply out over worker threads"))
                .arg(Arg::with_name("xfen")
                    .value_name("XFEN_STRING")
                    .default_value(START_XFEN)
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to analyze in X-FEN notation")))
            .subcommand(SubCommand::with_name("counts")
                .about("Counts the number of legal variations from a given starting position \
                        to a specified\ndepth. Defaults to the standard starting position.")
                .arg(Arg::with_name("depth")
                    .long("depth")
                    .short("d")
                    .value_name("DEPTH")
                    .takes_value(true)
                    .required(true)
                    .help("Depth to search the position"))
                .arg(Arg::with_name("xfen")
                    .value_name("XFEN_STRING")
                    .default_value(START_XFEN)
                    .hide_default_value(true)
                    .multiple(true)
                    .help("Position to search in X-FEN notation")))
            .get_matches();

    let log_file = PathBuf::from(matches.value_of_os("log-file").expect("INFALLIBLE"));
    let log_level = match matches.value_of("log-level") {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        Some(level) => return Err(Error(format!("{}: invalid log level", level))),
        None => unreachable!(),
    };

    let _logger = if matches.is_present("log") {
        WriteLogger::init(
            log_level,
            Config::default(),
            File::create(&log_file).map_err(|err| {
                Error(format!("{}: {}", log_file.display(), err))
            })?)
    } else {
        WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink())
    };

    match matches.subcommand() {
        ("predict", Some(matches)) => {
            let depth = matches
                .value_of("depth")
                .expect("INFALLIBLE")
                .parse()
                .map_err(|_| {Error("depth must be numeric".to_owned())})?;

            let analyzer: Box<dyn Analyzer> = if matches.is_present("parallel") {
                Box::new(ParallelMinimax::new())
            } else {
                Box::new(Minimax::new())
            };

            println!();
            for xfen in matches.values_of("xfen").expect("INFALLIBLE") {
                let board: Board =
                    xfen.parse().map_err(|err| {Error(format!("{}: {}", xfen, err))})?;
                let prediction = analyzer
                    .predict_moves(&board, depth)
                    .map_err(|err| {Error(err.to_string())})?;

                println!("{}", xfen);
                print_prediction(&prediction, board.file_count());
                println!();
            }
        },
        ("counts", Some(matches)) => {
            let depth = matches
                .value_of("depth")
                .expect("INFALLIBLE")
                .parse()
                .map_err(|_| {Error("depth must be numeric".to_owned())})?;

            println!();
            for xfen in matches.values_of("xfen").expect("INFALLIBLE") {
                let board: Board =
                    xfen.parse().map_err(|err| {Error(format!("{}: {}", xfen, err))})?;
                println!("{}", xfen);
                let count = variations::print(&board, depth);
                println!("Depth {} total:\t{:12}\n", depth, count);
            }
        },
        _ => unreachable!(),
    }

    Ok(())
}

/// Prints one prediction as a move listing plus the projected outcome.
fn print_prediction(prediction: &MovePrediction, file_count: u8) {
    for (index, entry) in prediction.moves().iter().enumerate() {
        let name = match entry {
            Some(move_positions) => {
                let names: Vec<String> = move_positions
                    .iter()
                    .map(|&position| position_name(position, file_count))
                    .collect();
                names.join("-")
            }
            None => "-".to_string(),
        };
        println!("\t{:2}.\t{}", index + 1, name);
    }

    match prediction.rating() {
        Board::WIN => println!("rating: white wins"),
        Board::DRAW => println!("rating: draw"),
        rating if rating == -Board::WIN => println!("rating: black wins"),
        rating => println!("rating: {:+.2}", 0.01 * f64::from(rating)),
    }
}

struct Error(String);

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Error { }
