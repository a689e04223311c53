use crate::constants::{COL_MEDIAN_INCOME, COL_ZIP_CODE, INCOME_SOURCE};
use crate::error::{PrepError, Result};
use crate::infra::http_client::HttpFetcher;
use crate::types::SourceReader;
use scraper::{ElementRef, Html, Selector};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// One data row of the income table
#[derive(Debug, Clone, PartialEq)]
pub struct RawIncomeRow {
    pub zip_code: String,
    pub community: Option<String>,
    pub median_income: String,
}

/// Scrapes the median income table from a web page (or a saved copy of it).
pub struct IncomeReader {
    fetcher: HttpFetcher,
    url: String,
    path: Option<PathBuf>,
}

impl IncomeReader {
    pub fn new(fetcher: HttpFetcher, url: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            fetcher,
            url: url.into(),
            path,
        }
    }
}

#[async_trait::async_trait]
impl SourceReader for IncomeReader {
    type Record = RawIncomeRow;

    fn source_name(&self) -> &'static str {
        INCOME_SOURCE
    }

    #[instrument(skip(self))]
    async fn read(&self) -> Result<Vec<RawIncomeRow>> {
        let html = match &self.path {
            Some(path) => {
                debug!("Reading income table from {}", path.display());
                super::read_text_file(INCOME_SOURCE, path)?
            }
            None => {
                info!("Fetching income table from {}", self.url);
                self.fetcher.get_text(INCOME_SOURCE, &self.url, &[]).await?
            }
        };
        let rows = parse_income_table(&html)?;
        info!("Parsed {} income rows", rows.len());
        if rows.is_empty() {
            warn!("No income rows found - the page structure may have changed");
        }
        Ok(rows)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PrepError::parse("css selector", format!("{}: {:?}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the income table: the first table inside `.content-box`, else the first table.
///
/// Columns are found by header text, so their order on the page does not matter.
pub fn parse_income_table(html: &str) -> Result<Vec<RawIncomeRow>> {
    let document = Html::parse_document(html);
    let content_sel = selector(".content-box")?;
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let header_sel = selector("th")?;
    let cell_sel = selector("td")?;

    let table = document
        .select(&content_sel)
        .find_map(|content| content.select(&table_sel).next())
        .or_else(|| document.select(&table_sel).next())
        .ok_or_else(|| PrepError::source_unavailable(INCOME_SOURCE, "no table found on page"))?;

    let mut rows = table.select(&row_sel);
    let header: Vec<String> = loop {
        let Some(row) = rows.next() else {
            return Err(PrepError::source_unavailable(INCOME_SOURCE, "income table has no header row"));
        };
        let mut cells: Vec<String> = row.select(&header_sel).map(|c| cell_text(&c)).collect();
        if cells.is_empty() {
            cells = row.select(&cell_sel).map(|c| cell_text(&c)).collect();
        }
        if !cells.is_empty() {
            break cells;
        }
    };

    let column = |name: &str| -> Result<usize> {
        header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| PrepError::parse("income table header", name))
    };
    let zip_idx = column(COL_ZIP_CODE)?;
    let income_idx = column(COL_MEDIAN_INCOME)?;
    let community_idx = column("Community").ok();

    let mut out = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.select(&cell_sel).map(|c| cell_text(&c)).collect();
        if cells.len() <= zip_idx.max(income_idx) {
            continue;
        }
        out.push(RawIncomeRow {
            zip_code: cells[zip_idx].clone(),
            community: community_idx
                .and_then(|i| cells.get(i))
                .filter(|c| !c.is_empty())
                .cloned(),
            median_income: cells[income_idx].clone(),
        });
    }
    Ok(out)
}
