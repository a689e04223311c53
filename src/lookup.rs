//! Interactive console session: confirm with `Go`, then look up zip codes until `0`.

use crate::domain::{FinalRow, PostalCode};
use crate::engine::merge::FinalTable;
use crate::error::{PrepError, Result};
use crate::report::PresentationRow;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

const GO: &str = "Go";

/// One parsed entry of the lookup loop
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Exit,
    Code(PostalCode),
}

/// `0` exits; anything that is not all digits is `InvalidInput`.
pub fn parse_query(entry: &str) -> Result<Query> {
    let entry = entry.trim();
    if entry.is_empty() || !entry.chars().all(|c| c.is_ascii_digit()) {
        return Err(PrepError::InvalidInput(entry.to_string()));
    }
    if entry.chars().all(|c| c == '0') {
        return Ok(Query::Exit);
    }
    // numeric but too long to be a zip code: a well-formed entry that matches nothing
    PostalCode::parse(entry)
        .map(Query::Code)
        .map_err(|_| PrepError::LookupNotFound(entry.to_string()))
}

pub fn find<'t>(table: &'t FinalTable, code: &PostalCode) -> Result<&'t FinalRow> {
    table
        .get(code)
        .ok_or_else(|| PrepError::LookupNotFound(code.to_string()))
}

pub struct LookupSession<'a, R, W> {
    table: &'a FinalTable,
    cities: &'a HashMap<PostalCode, String>,
    region: String,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> LookupSession<'a, R, W> {
    pub fn new(
        table: &'a FinalTable,
        cities: &'a HashMap<PostalCode, String>,
        region: impl Into<String>,
        input: R,
        output: W,
    ) -> Self {
        Self {
            table,
            cities,
            region: region.into(),
            input,
            output,
        }
    }

    /// `None` at end of input
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    /// Ask for `Go` until it is typed. Returns `false` if input ends first.
    pub fn confirm_go(&mut self) -> Result<bool> {
        loop {
            match self.prompt("If you have understood, please type in 'Go' to proceed opening the map: ")? {
                None => return Ok(false),
                Some(answer) if answer.trim() == GO => return Ok(true),
                Some(_) => writeln!(self.output, "Please type 'Go' again")?,
            }
        }
    }

    pub fn print_documents(&mut self, documents: &[PathBuf]) -> Result<()> {
        writeln!(self.output, "\nOpen these documents in your browser:")?;
        for doc in documents {
            let shown = doc.canonicalize().unwrap_or_else(|_| doc.clone());
            writeln!(self.output, "  file://{}", shown.display())?;
        }
        writeln!(self.output)?;
        Ok(())
    }

    pub fn print_guide(&mut self, documents: &[PathBuf]) -> Result<()> {
        writeln!(self.output, "This run produced the following documents:")?;
        for doc in documents {
            let name = doc.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            writeln!(self.output, "  - {}", name)?;
        }
        writeln!(
            self.output,
            "The map shows shelter capacity and insurance cost per zip code, past earthquakes and shelters."
        )?;
        writeln!(self.output, "Each layer can be switched on and off from the control in the top right corner.")?;
        Ok(())
    }

    /// Full session: guide, `Go` gate, document list, then the lookup loop.
    pub fn run(&mut self, documents: &[PathBuf]) -> Result<()> {
        self.print_guide(documents)?;
        if !self.confirm_go()? {
            return Ok(());
        }
        self.print_documents(documents)?;
        self.lookup_loop()
    }

    /// Look up zip codes until `0` or end of input. Recoverable errors are reported and the loop continues.
    pub fn lookup_loop(&mut self) -> Result<()> {
        let prompt = format!(
            "Enter a {} County zip code to show its information. Enter 0 to exit: ",
            self.region
        );
        let table = self.table;
        while let Some(entry) = self.prompt(&prompt)? {
            let outcome = parse_query(&entry).and_then(|query| match query {
                Query::Exit => Ok(None),
                Query::Code(code) => find(table, &code).map(Some),
            });
            match outcome {
                Ok(None) => {
                    writeln!(self.output, "End of program")?;
                    return Ok(());
                }
                Ok(Some(row)) => self.print_row(row)?,
                Err(e) if e.is_recoverable() => {
                    debug!("lookup of '{}' failed: {}", entry, e);
                    let message = match e {
                        PrepError::InvalidInput(_) => "Invalid format. Enter zip code in numeric value",
                        _ => "Zipcode not found",
                    };
                    writeln!(self.output, "{}", message)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn print_row(&mut self, row: &FinalRow) -> Result<()> {
        let shown = PresentationRow::from_final(row);
        writeln!(self.output, "Zipcode: {}", shown.postal_code)?;
        if let Some(city) = self.cities.get(&row.postal_code) {
            writeln!(self.output, "City: {}", city)?;
        }
        writeln!(self.output, "Housing units: {}", shown.housing_units)?;
        writeln!(self.output, "Median home value: {}", shown.median_home_value)?;
        writeln!(self.output, "Raw cost of Insurance per House: {}", shown.raw_insurance_per_house)?;
        writeln!(
            self.output,
            "Cost of insuring 10% of the houses in the ZIP Code: {}",
            shown.coverage_cost_10pct
        )?;
        writeln!(self.output, "Shelter capacity: {}", shown.shelter_capacity)?;
        writeln!(self.output, "Total population: {}", shown.population)?;
        writeln!(self.output, "Shelter capacity percentage: {}", shown.shelter_capacity_pct)?;
        Ok(())
    }
}
