use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Prints `payload` as JSON or YAML. Returns `false` for human output so
    /// the caller renders its own table.
    pub fn emit<T: Serialize + ?Sized>(&self, payload: &T) -> Result<bool> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(payload)?),
            OutputFormat::Human => return Ok(false),
        }
        Ok(true)
    }
}
