// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use logger::*;

pub fn main() {
    Logger::new()
        .label("levels")
        .level(Level::Trace)
        .init()
        .expect("Failed to initialize logger");

    trace!("per-row detail");
    debug!("module target shown below info");
    info!("label shown from info up");
    warn!("something looks off");
    error!("this run will fail");
    fatal!("exiting with status 1");
}
