// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::phase::{Phase, PhaseSet};

use clap::{App, Arg, ArgMatches};
use logger::*;
use serde_derive::*;

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process;
use std::str::FromStr;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    chart: Chart,
    phase: Option<Vec<Phase>>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(default = "default_cpu_input")]
    cpu_input: String,
    #[serde(default = "default_gpu_input")]
    gpu_input: String,
    #[serde(default = "default_bar_output")]
    bar_output: String,
    #[serde(default = "default_scatter_output")]
    scatter_output: String,
    seed: Option<u64>,
    sample: Option<String>,
    #[serde(with = "LevelDef")]
    #[serde(default = "default_logging_level")]
    logging: Level,
}

impl Default for General {
    fn default() -> General {
        General {
            cpu_input: default_cpu_input(),
            gpu_input: default_gpu_input(),
            bar_output: default_bar_output(),
            scatter_output: default_scatter_output(),
            seed: None,
            sample: None,
            logging: default_logging_level(),
        }
    }
}

impl General {
    pub fn cpu_input(&self) -> &str {
        &self.cpu_input
    }

    pub fn set_cpu_input(&mut self, path: String) {
        self.cpu_input = path;
    }

    pub fn gpu_input(&self) -> &str {
        &self.gpu_input
    }

    pub fn set_gpu_input(&mut self, path: String) {
        self.gpu_input = path;
    }

    pub fn bar_output(&self) -> &str {
        &self.bar_output
    }

    pub fn set_bar_output(&mut self, path: String) {
        self.bar_output = path;
    }

    pub fn scatter_output(&self) -> &str {
        &self.scatter_output
    }

    pub fn set_scatter_output(&mut self, path: String) {
        self.scatter_output = path;
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn sample(&self) -> Option<&str> {
        self.sample.as_deref()
    }

    pub fn set_sample(&mut self, sample: Option<String>) {
        self.sample = sample;
    }

    pub fn logging(&self) -> Level {
        self.logging
    }

    pub fn set_logging(&mut self, level: Level) {
        self.logging = level;
    }
}

/// Canvas sizes in pixels.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chart {
    #[serde(default = "default_bar_width")]
    bar_width: u32,
    #[serde(default = "default_bar_height")]
    bar_height: u32,
    #[serde(default = "default_scatter_width")]
    scatter_width: u32,
    #[serde(default = "default_scatter_height")]
    scatter_height: u32,
}

impl Default for Chart {
    fn default() -> Chart {
        Chart {
            bar_width: default_bar_width(),
            bar_height: default_bar_height(),
            scatter_width: default_scatter_width(),
            scatter_height: default_scatter_height(),
        }
    }
}

fn default_cpu_input() -> String {
    "canny_cpu.csv".to_string()
}

fn default_gpu_input() -> String {
    "canny_gpu.csv".to_string()
}

fn default_bar_output() -> String {
    "bar_one_image_comparison_log.svg".to_string()
}

fn default_scatter_output() -> String {
    "size_vs_time_loglog.svg".to_string()
}

fn default_bar_width() -> u32 {
    1000
}

fn default_bar_height() -> u32 {
    600
}

fn default_scatter_width() -> u32 {
    800
}

fn default_scatter_height() -> u32 {
    600
}

#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
#[serde(remote = "Level")]
#[serde(deny_unknown_fields)]
enum LevelDef {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_logging_level() -> Level {
    Level::Info
}

fn app() -> App<'static, 'static> {
    App::new(NAME)
        .version(VERSION)
        .author("Brian Martin <bmartin@twitter.com>")
        .about("Plot CPU vs. GPU Canny edge detector benchmark results")
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu")
                .long("cpu")
                .value_name("FILE")
                .help("CSV results from the CPU implementation")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("gpu")
                .long("gpu")
                .value_name("FILE")
                .help("CSV results from the GPU implementation")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("bar-output")
                .long("bar-output")
                .value_name("FILE")
                .help("Per-phase bar chart SVG")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("scatter-output")
                .long("scatter-output")
                .value_name("FILE")
                .help("Size vs. total time scatter plot SVG")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seed")
                .long("seed")
                .value_name("N")
                .help("Seed for choosing the bar chart sample")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("sample")
                .long("sample")
                .value_name("ID")
                .help("Plot this file identifier instead of a random one")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

impl Config {
    /// parse command line options and return `Config`
    pub fn new() -> Config {
        Config::from_args(std::env::args_os()).unwrap_or_else(|e| match e {
            Error::Cli(e) => e.exit(),
            e => {
                println!("ERROR: {}", e);
                process::exit(1);
            }
        })
    }

    /// Build a config from an explicit argument list. The first item is the
    /// program name.
    pub fn from_args<I, T>(args: I) -> Result<Config>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;

        let mut config = if let Some(file) = matches.value_of("config") {
            Config::load_from_file(file)?
        } else {
            Default::default()
        };

        if let Some(cpu) = matches.value_of("cpu") {
            config.general.set_cpu_input(cpu.to_string());
        }

        if let Some(gpu) = matches.value_of("gpu") {
            config.general.set_gpu_input(gpu.to_string());
        }

        if let Some(bar) = matches.value_of("bar-output") {
            config.general.set_bar_output(bar.to_string());
        }

        if let Some(scatter) = matches.value_of("scatter-output") {
            config.general.set_scatter_output(scatter.to_string());
        }

        if let Some(seed) = parse_numeric_arg(&matches, "seed")? {
            config.general.set_seed(Some(seed));
        }

        if let Some(sample) = matches.value_of("sample") {
            config.general.set_sample(Some(sample.to_string()));
        }

        let verbose = match matches.occurrences_of("verbose") {
            0 => None,
            1 => Some(Level::Debug),
            _ => Some(Level::Trace),
        };
        if let Some(level) = verbose {
            // flags only ever raise the level from the file
            let level = std::cmp::max(config.general.logging(), level);
            config.general.set_logging(level);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)
            .map_err(|e| Error::Config(format!("failed to open {}: {}", path.display(), e)))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        content
            .parse()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject settings that would only fail later, after inputs are read.
    pub fn validate(&self) -> Result<()> {
        let sizes = [self.bar_size(), self.scatter_size()];
        if sizes.iter().any(|(w, h)| *w == 0 || *h == 0) {
            return Err(Error::Config("chart dimensions must be non-zero".to_string()));
        }
        if self.bar_output() == self.scatter_output() {
            return Err(Error::Config(format!(
                "bar and scatter outputs are the same file: {}",
                self.bar_output()
            )));
        }
        if let Some(sample) = self.sample() {
            if sample.is_empty() {
                return Err(Error::Config("sample identifier is empty".to_string()));
            }
        }
        self.phases().map(|_| ())
    }

    pub fn cpu_input(&self) -> &str {
        self.general.cpu_input()
    }

    pub fn gpu_input(&self) -> &str {
        self.general.gpu_input()
    }

    pub fn bar_output(&self) -> &str {
        self.general.bar_output()
    }

    pub fn scatter_output(&self) -> &str {
        self.general.scatter_output()
    }

    /// seed for the sample choice, entropy when unset
    pub fn seed(&self) -> Option<u64> {
        self.general.seed()
    }

    /// explicit sample identifier, bypasses the random choice
    pub fn sample(&self) -> Option<&str> {
        self.general.sample()
    }

    /// get logging level
    pub fn logging(&self) -> Level {
        self.general.logging()
    }

    pub fn bar_size(&self) -> (u32, u32) {
        (self.chart.bar_width, self.chart.bar_height)
    }

    pub fn scatter_size(&self) -> (u32, u32) {
        (self.chart.scatter_width, self.chart.scatter_height)
    }

    /// Phases to plot, the six Canny stages unless the file lists its own.
    pub fn phases(&self) -> Result<PhaseSet> {
        match &self.phase {
            Some(phases) => PhaseSet::new(phases.clone()),
            None => Ok(PhaseSet::default()),
        }
    }

    pub fn print(&self) {
        info!("-----");
        info!(
            "Config: Input: CPU: {} GPU: {}",
            self.cpu_input(),
            self.gpu_input()
        );
        info!(
            "Config: Output: Bar: {} ({}x{}) Scatter: {} ({}x{})",
            self.bar_output(),
            self.chart.bar_width,
            self.chart.bar_height,
            self.scatter_output(),
            self.chart.scatter_width,
            self.chart.scatter_height,
        );
        info!(
            "Config: Sample: {} Seed: {}",
            self.sample().unwrap_or("Random"),
            self.seed()
                .map(|v| format!("{}", v))
                .unwrap_or_else(|| "Entropy".to_string()),
        );
        if let Ok(phases) = self.phases() {
            let columns: Vec<&str> = phases.columns().collect();
            info!("Config: Phases: {}", columns.join(", "));
        }
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(content)
    }
}

/// a helper function to parse a numeric argument by name from `ArgMatches`
fn parse_numeric_arg<T: FromStr>(matches: &ArgMatches, key: &str) -> Result<Option<T>> {
    matches
        .value_of(key)
        .map(|v| {
            v.parse()
                .map_err(|_| Error::Config(format!("could not parse {}: {}", key, v)))
        })
        .transpose()
}
