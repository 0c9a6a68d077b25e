// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use canny_plot::{Config, VERSION};

use logger::*;

pub fn main() {
    let config = Config::new();

    Logger::new()
        .label("canny_plot")
        .level(config.logging())
        .init()
        .expect("Failed to initialize logger");

    info!("canny-plot {} initializing...", VERSION);
    config.print();

    match canny_plot::run(config) {
        Ok(outcome) => info!(
            "done: sample {} plotted to {} and {}",
            outcome.sample,
            outcome.bar_output.display(),
            outcome.scatter_output.display()
        ),
        Err(e) => fatal!("{}", e),
    }
}
