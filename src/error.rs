// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::table::Architecture;

use plotters::prelude::DrawingAreaErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a report run can fail. All of them are fatal to the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("data format error in {path}: {reason}")]
    DataFormat { path: String, reason: String },

    #[error("no file identifier is present in both {cpu} and {gpu}")]
    NoCommonSample { cpu: String, gpu: String },

    #[error("sample {id:?} is not present in both result tables")]
    UnknownSample { id: String },

    #[error("invalid measurement in {arch} row {id:?}: {column} = {value} (must be > 0 for a log axis)")]
    InvalidMeasurement {
        arch: Architecture,
        id: String,
        column: String,
        value: f64,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("render error: {0}")]
    Render(String),
}

impl Error {
    pub(crate) fn data_format(path: impl AsRef<str>, reason: impl Into<String>) -> Self {
        Error::DataFormat {
            path: path.as_ref().to_owned(),
            reason: reason.into(),
        }
    }
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Error::Render(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let e = Error::InvalidMeasurement {
            arch: Architecture::Gpu,
            id: "lena.png".to_owned(),
            column: "NMS".to_owned(),
            value: 0.0,
        };
        let msg = e.to_string();
        assert!(msg.contains("GPU"));
        assert!(msg.contains("lena.png"));
        assert!(msg.contains("NMS"));

        let e = Error::NoCommonSample {
            cpu: "canny_cpu.csv".to_owned(),
            gpu: "canny_gpu.csv".to_owned(),
        };
        assert!(e.to_string().contains("canny_cpu.csv"));
    }
}
