//! Output formatting

use clap::ValueEnum;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print a single document. Tables have no generic shape, so they fall
    /// back to pretty JSON.
    pub fn print<T: Serialize + ?Sized>(&self, data: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data)?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yaml::to_string(data)?);
            }
        }
        Ok(())
    }

    /// Print a list of records, as a table when asked for one.
    pub fn print_rows<T: Serialize + Tabled>(&self, rows: &[T]) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table => {
                println!("{}", Table::new(rows).with(Style::rounded()));
                Ok(())
            }
            OutputFormat::Json | OutputFormat::Yaml => self.print(rows),
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, OutputFormat::Table)
    }
}
